//! YAML and JSON data handling utilities.

use hookwright_types::{GenerationError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Load YAML from string.
///
/// An empty document loads as an empty mapping.
pub fn load_yaml(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_yaml::from_str(content).map_err(GenerationError::Yaml)
}

/// Load YAML from file.
pub fn load_yaml_file(path: impl AsRef<Path>) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(GenerationError::Io)?;
    load_yaml(&content)
}

/// Save YAML to file.
pub fn save_yaml_file(path: impl AsRef<Path>, data: &impl Serialize) -> Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    fs::write(path, yaml).map_err(GenerationError::Io)?;
    Ok(())
}

/// Recursively overlay one value on another; the overlay wins at every leaf.
///
/// This is for configuration layering only. Generated data is combined with
/// the lossless merge in `hookwright-data`, which never picks a side.
pub fn overlay(mut base: Value, overlay_value: Value) -> Value {
    match (&mut base, overlay_value) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_val) => {
                        let current = base_val.take();
                        *base_val = overlay(current, overlay_val);
                    }
                    None => {
                        base_map.insert(key, overlay_val);
                    }
                }
            }
            base
        }
        (_, overlay_val) => overlay_val,
    }
}

/// Get value at a path in slash or dot notation.
pub fn get_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;

    for part in path.split(|c| c == '.' || c == '/').filter(|p| !p.is_empty()) {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overlay_prefers_overlay() {
        let merged = overlay(
            json!({"a": 1, "nested": {"x": 1, "y": 2}}),
            json!({"a": 2, "nested": {"y": 3}}),
        );
        assert_eq!(merged, json!({"a": 2, "nested": {"x": 1, "y": 3}}));
    }

    #[test]
    fn test_get_path() {
        let value = json!({"services": {"foo": {"arguments": ["@current_user"]}}});
        assert_eq!(
            get_path(&value, "services/foo/arguments/0"),
            Some(&json!("@current_user"))
        );
        assert_eq!(get_path(&value, "services.bar"), None);
    }

    #[test]
    fn test_load_empty_yaml() {
        assert_eq!(load_yaml("   \n").unwrap(), json!({}));
    }
}
