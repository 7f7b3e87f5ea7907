//! Class-level plugin metadata: docblock annotations and PHP attributes.
//!
//! The same definition renders either as a Doctrine-style annotation placed
//! inside the class docblock, or as a native attribute placed above the class,
//! depending on the target framework version.

use indexmap::IndexMap;

/// A value inside an annotation or attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationValue {
    /// Plain string
    Str(String),
    /// Translatable string
    Translation(String),
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Constant or class reference, written verbatim
    Raw(String),
    /// List of values
    List(Vec<AnnotationValue>),
    /// Keyed values
    Map(IndexMap<String, AnnotationValue>),
}

impl From<&str> for AnnotationValue {
    fn from(s: &str) -> Self {
        AnnotationValue::Str(s.to_string())
    }
}

impl From<String> for AnnotationValue {
    fn from(s: String) -> Self {
        AnnotationValue::Str(s)
    }
}

impl From<bool> for AnnotationValue {
    fn from(b: bool) -> Self {
        AnnotationValue::Bool(b)
    }
}

/// A plugin definition: class short name plus keyed values.
///
/// ```
/// use hookwright_render::{Annotation, AnnotationValue};
///
/// let block = Annotation::new("Block")
///     .value("id", "test_module_alpha")
///     .value("admin_label", AnnotationValue::Translation("Alpha".into()));
///
/// assert_eq!(block.render_annotation(), vec![
///     "@Block(",
///     "  id = \"test_module_alpha\",",
///     "  admin_label = @Translation(\"Alpha\"),",
///     ")",
/// ]);
/// assert_eq!(block.render_attribute(), vec![
///     "#[Block(",
///     "  id: 'test_module_alpha',",
///     "  admin_label: new TranslatableMarkup('Alpha'),",
///     ")]",
/// ]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Short class name, e.g. `Block`
    pub class: String,
    /// Definition values in output order
    pub values: IndexMap<String, AnnotationValue>,
}

impl Annotation {
    /// Start a definition.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            values: IndexMap::new(),
        }
    }

    /// Add a value.
    pub fn value(mut self, key: impl Into<String>, value: impl Into<AnnotationValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Whether any value is translatable, i.e. the attribute form needs the
    /// translatable markup class imported.
    pub fn uses_translation(&self) -> bool {
        fn any(value: &AnnotationValue) -> bool {
            match value {
                AnnotationValue::Translation(_) => true,
                AnnotationValue::List(items) => items.iter().any(any),
                AnnotationValue::Map(map) => map.values().any(any),
                _ => false,
            }
        }
        self.values.values().any(any)
    }

    /// Docblock annotation lines, without comment prefixes.
    pub fn render_annotation(&self) -> Vec<String> {
        let mut lines = vec![format!("@{}(", self.class)];
        for (key, value) in &self.values {
            let mut rendered = annotation_value(value, 1);
            if let Some(first) = rendered.first_mut() {
                *first = format!("  {} = {}", key, first);
            }
            if let Some(last) = rendered.last_mut() {
                last.push(',');
            }
            lines.extend(rendered);
        }
        lines.push(")".to_string());
        lines
    }

    /// Attribute lines.
    pub fn render_attribute(&self) -> Vec<String> {
        let mut lines = vec![format!("#[{}(", self.class)];
        for (key, value) in &self.values {
            let mut rendered = attribute_value(value, 1);
            if let Some(first) = rendered.first_mut() {
                *first = format!("  {}: {}", key, first);
            }
            if let Some(last) = rendered.last_mut() {
                last.push(',');
            }
            lines.extend(rendered);
        }
        lines.push(")]".to_string());
        lines
    }
}

fn annotation_value(value: &AnnotationValue, depth: usize) -> Vec<String> {
    let pad = "  ".repeat(depth);
    match value {
        AnnotationValue::Str(s) => vec![format!("\"{}\"", s.replace('"', "\"\""))],
        AnnotationValue::Translation(s) => vec![format!("@Translation(\"{}\")", s.replace('"', "\"\""))],
        AnnotationValue::Bool(b) => vec![if *b { "TRUE" } else { "FALSE" }.to_string()],
        AnnotationValue::Int(i) => vec![i.to_string()],
        AnnotationValue::Raw(r) => vec![r.clone()],
        AnnotationValue::List(items) => {
            let mut lines = vec!["{".to_string()];
            for item in items {
                let mut rendered = annotation_value(item, depth + 1);
                if let Some(first) = rendered.first_mut() {
                    *first = format!("{}  {}", pad, first);
                }
                if let Some(last) = rendered.last_mut() {
                    last.push(',');
                }
                lines.extend(rendered);
            }
            lines.push(format!("{}}}", pad));
            lines
        }
        AnnotationValue::Map(map) => {
            let mut lines = vec!["{".to_string()];
            for (key, item) in map {
                let mut rendered = annotation_value(item, depth + 1);
                if let Some(first) = rendered.first_mut() {
                    *first = format!("{}  \"{}\" = {}", pad, key, first);
                }
                if let Some(last) = rendered.last_mut() {
                    last.push(',');
                }
                lines.extend(rendered);
            }
            lines.push(format!("{}}}", pad));
            lines
        }
    }
}

fn attribute_value(value: &AnnotationValue, depth: usize) -> Vec<String> {
    let pad = "  ".repeat(depth);
    match value {
        AnnotationValue::Str(s) => vec![php_string(s)],
        AnnotationValue::Translation(s) => vec![format!("new TranslatableMarkup({})", php_string(s))],
        AnnotationValue::Bool(b) => vec![if *b { "TRUE" } else { "FALSE" }.to_string()],
        AnnotationValue::Int(i) => vec![i.to_string()],
        AnnotationValue::Raw(r) => vec![r.clone()],
        AnnotationValue::List(items) => {
            let mut lines = vec!["[".to_string()];
            for item in items {
                let mut rendered = attribute_value(item, depth + 1);
                if let Some(first) = rendered.first_mut() {
                    *first = format!("{}  {}", pad, first);
                }
                if let Some(last) = rendered.last_mut() {
                    last.push(',');
                }
                lines.extend(rendered);
            }
            lines.push(format!("{}]", pad));
            lines
        }
        AnnotationValue::Map(map) => {
            let mut lines = vec!["[".to_string()];
            for (key, item) in map {
                let mut rendered = attribute_value(item, depth + 1);
                if let Some(first) = rendered.first_mut() {
                    *first = format!("{}  {} => {}", pad, php_string(key), first);
                }
                if let Some(last) = rendered.last_mut() {
                    last.push(',');
                }
                lines.extend(rendered);
            }
            lines.push(format!("{}]", pad));
            lines
        }
    }
}

/// Single-quoted PHP string literal.
pub fn php_string(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
