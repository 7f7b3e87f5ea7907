//! Lossless merging of request data.
//!
//! Merging unifies two requests for the same component. It may add values but
//! never replace one:
//!
//! | shape                    | rule                                          |
//! |--------------------------|-----------------------------------------------|
//! | single scalar            | equal or one side empty, else data loss       |
//! | multiple (any format)    | append entries not already present            |
//! | single complex           | per-key union, recursing into shared keys     |
//! | mapping                  | structural union via [`merge_values`]         |

use crate::item::{DataItem, ItemValue};
use hookwright_types::{DataLossError, PropertyFormat};
use serde_json::Value;

/// Merge `other` into `existing`. Returns whether `existing` changed.
pub(crate) fn merge_items(existing: &mut DataItem, other: &DataItem) -> Result<bool, DataLossError> {
    if other.is_empty() {
        return Ok(false);
    }
    if existing.is_empty() {
        existing.value = other.value.clone();
        let path = existing.path().to_string();
        existing.repath(path);
        return Ok(true);
    }

    if existing.definition().multiple {
        let path = existing.path().to_string();
        let mut changed = false;
        for incoming in other.items() {
            if existing.items().iter().any(|e| e == incoming) {
                continue;
            }
            let mut entry = incoming.clone();
            entry.repath(format!("{}/{}", path, existing.items().len()));
            if let ItemValue::List(items) = &mut existing.value {
                items.push(entry);
                changed = true;
            }
        }
        return Ok(changed);
    }

    match existing.definition().format {
        PropertyFormat::Complex => {
            let ItemValue::Complex(incoming) = &other.value else {
                return Ok(false);
            };
            let mut changed = false;
            for (name, child) in incoming {
                let target = existing
                    .child(name)
                    .map_err(|_| DataLossError::new(child.path(), Value::Null, child.export()))?;
                changed |= merge_items(target, child)?;
            }
            Ok(changed)
        }
        PropertyFormat::Mapping => {
            let path = existing.path().to_string();
            match (&mut existing.value, &other.value) {
                (ItemValue::Mapping(mine), ItemValue::Mapping(theirs)) => merge_values(mine, theirs, &path),
                _ => Ok(false),
            }
        }
        _ => {
            if existing == other {
                Ok(false)
            } else {
                Err(DataLossError::new(existing.path(), existing.export(), other.export()))
            }
        }
    }
}

/// Structural merge of plain values.
///
/// Objects are unioned per key, arrays gain elements they do not contain yet,
/// and differing scalars are a data loss.
///
/// ```
/// use hookwright_data::merge_values;
/// use serde_json::json;
///
/// let mut existing = json!({"alpha": "value", "list": [1, 2]});
/// let changed = merge_values(&mut existing, &json!({"beta": "value", "list": [2, 3]}), "").unwrap();
///
/// assert!(changed);
/// assert_eq!(existing, json!({"alpha": "value", "list": [1, 2, 3], "beta": "value"}));
/// assert!(merge_values(&mut existing, &json!({"alpha": "other"}), "").is_err());
/// ```
pub fn merge_values(existing: &mut Value, incoming: &Value, path: &str) -> Result<bool, DataLossError> {
    if existing == incoming || incoming.is_null() {
        return Ok(false);
    }
    if existing.is_null() {
        *existing = incoming.clone();
        return Ok(true);
    }

    match (existing, incoming) {
        (Value::Object(mine), Value::Object(theirs)) => {
            let mut changed = false;
            for (key, value) in theirs {
                let child_path = join_path(path, key);
                match mine.get_mut(key) {
                    Some(current) => changed |= merge_values(current, value, &child_path)?,
                    None => {
                        mine.insert(key.clone(), value.clone());
                        changed = true;
                    }
                }
            }
            Ok(changed)
        }
        (Value::Array(mine), Value::Array(theirs)) => {
            let mut changed = false;
            for value in theirs {
                if !mine.contains(value) {
                    mine.push(value.clone());
                    changed = true;
                }
            }
            Ok(changed)
        }
        (mine, theirs) => Err(DataLossError::new(path, mine.clone(), theirs.clone())),
    }
}

fn join_path(base: &str, key: &str) -> String {
    if base.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", base, key)
    }
}
