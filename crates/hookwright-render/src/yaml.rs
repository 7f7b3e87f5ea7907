//! YAML writer in the framework's house style.
//!
//! Output follows the conventions of the framework's own YAML dumper:
//! two-space indentation, block style down to a configurable nesting level and
//! flow style (`{ a: b }`, `[a, b]`) below it, and single-quoted strings
//! wherever a plain scalar would be ambiguous.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Renders JSON-model values as YAML text.
///
/// ```
/// use hookwright_render::YamlWriter;
/// use serde_json::json;
///
/// let yaml = YamlWriter::new().inline_level(3).render(&json!({
///     "services": {
///         "test_module.alpha": {
///             "class": "Drupal\\test_module\\Alpha",
///             "arguments": ["@current_user"],
///         }
///     }
/// }));
///
/// assert_eq!(yaml, "services:\n  test_module.alpha:\n    class: Drupal\\test_module\\Alpha\n    arguments: ['@current_user']\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct YamlWriter {
    inline_level: Option<usize>,
    blank_line_depth: Option<usize>,
}

impl YamlWriter {
    /// A writer that never switches to flow style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collections nested at least this deep are written inline.
    pub fn inline_level(mut self, level: usize) -> Self {
        self.inline_level = Some(level);
        self
    }

    /// Optional inline level.
    pub fn maybe_inline_level(mut self, level: Option<usize>) -> Self {
        self.inline_level = level;
        self
    }

    /// Depth at which sibling keys from different origins are separated by
    /// a blank line. See [`YamlWriter::render_with_origins`].
    pub fn blank_lines_at(mut self, depth: usize) -> Self {
        self.blank_line_depth = Some(depth);
        self
    }

    /// Render a value.
    pub fn render(&self, value: &Value) -> String {
        self.render_with_origins(value, &IndexMap::new())
    }

    /// Render a value, separating adjacent keys at the blank-line depth with
    /// an empty line when `origins` assigns them different origins.
    ///
    /// `origins` is keyed by the slash-joined key path of each entry.
    pub fn render_with_origins(&self, value: &Value, origins: &IndexMap<String, String>) -> String {
        let mut out = String::new();
        match value {
            Value::Object(map) if !map.is_empty() => {
                self.write_map(map, 0, &mut Vec::new(), origins, &mut out);
            }
            Value::Array(items) if !items.is_empty() => {
                self.write_seq(items, 0, &mut Vec::new(), origins, &mut out);
            }
            Value::Object(_) => out.push_str("{  }\n"),
            Value::Array(_) => out.push_str("[]\n"),
            scalar => {
                out.push_str(&scalar_to_yaml(scalar));
                out.push('\n');
            }
        }
        out
    }

    fn is_inline(&self, depth: usize) -> bool {
        self.inline_level.map_or(false, |level| depth >= level)
    }

    fn write_map(
        &self,
        map: &Map<String, Value>,
        depth: usize,
        path: &mut Vec<String>,
        origins: &IndexMap<String, String>,
        out: &mut String,
    ) {
        let indent = "  ".repeat(depth);
        let mut previous_origin: Option<&String> = None;

        for (key, value) in map {
            path.push(key.clone());
            if self.blank_line_depth == Some(depth) {
                let origin = origins.get(&path.join("/"));
                if let (Some(previous), Some(current)) = (previous_origin, origin) {
                    if previous != current {
                        out.push('\n');
                    }
                }
                previous_origin = origin;
            }

            out.push_str(&indent);
            out.push_str(&key_to_yaml(key));
            out.push(':');
            self.write_nested(value, depth + 1, path, origins, out);
            path.pop();
        }
    }

    fn write_seq(
        &self,
        items: &[Value],
        depth: usize,
        path: &mut Vec<String>,
        origins: &IndexMap<String, String>,
        out: &mut String,
    ) {
        let indent = "  ".repeat(depth);
        for (index, value) in items.iter().enumerate() {
            path.push(index.to_string());
            out.push_str(&indent);
            out.push('-');
            self.write_nested(value, depth + 1, path, origins, out);
            path.pop();
        }
    }

    fn write_nested(
        &self,
        value: &Value,
        depth: usize,
        path: &mut Vec<String>,
        origins: &IndexMap<String, String>,
        out: &mut String,
    ) {
        match value {
            Value::Object(map) if !map.is_empty() && !self.is_inline(depth) => {
                out.push('\n');
                self.write_map(map, depth, path, origins, out);
            }
            Value::Array(items) if !items.is_empty() && !self.is_inline(depth) => {
                out.push('\n');
                self.write_seq(items, depth, path, origins, out);
            }
            other => {
                out.push(' ');
                out.push_str(&inline(other));
                out.push('\n');
            }
        }
    }
}

/// Flow-style rendering of any value.
fn inline(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => "{  }".to_string(),
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", key_to_yaml(k), inline(v)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        Value::Array(items) => {
            let entries: Vec<String> = items.iter().map(inline).collect();
            format!("[{}]", entries.join(", "))
        }
        scalar => scalar_to_yaml(scalar),
    }
}

fn key_to_yaml(key: &str) -> String {
    string_to_yaml(key)
}

fn scalar_to_yaml(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string_to_yaml(s),
        other => inline(other),
    }
}

fn string_to_yaml(s: &str) -> String {
    if s.contains('\n') || s.chars().any(|c| c.is_control()) {
        let escaped = s
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\t', "\\t");
        return format!("\"{}\"", escaped);
    }
    if needs_quoting(s) {
        return format!("'{}'", s.replace('\'', "''"));
    }
    s.to_string()
}

/// Whether a string must be single-quoted to survive a YAML round trip.
pub fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }
    const SPECIAL: &[char] = &[' ', '\'', '"', ':', '{', '}', '[', ']', ',', '&', '*', '#', '?'];
    const LEADING: &[char] = &['-', '?', '|', '<', '>', '=', '!', '%', '@', '`'];

    if s.contains(SPECIAL) || s.starts_with(LEADING) {
        return true;
    }

    let lower = s.to_ascii_lowercase();
    if matches!(
        lower.as_str(),
        "null" | "~" | "true" | "false" | "yes" | "no" | "on" | "off" | ".inf" | ".nan"
    ) {
        return true;
    }

    s.parse::<f64>().is_ok()
}
