//! Lazy default evaluation.
//!
//! Defaults that are functions of sibling values are evaluated on demand, each
//! at most once per item. A default may read a sibling whose own default has
//! not run yet; that sibling is resolved first. Cycles are a logic error.

use crate::definition::DefaultValue;
use crate::item::DataItem;
use hookwright_types::{GenerationError, LogicError, Result};
use indexmap::IndexMap;
use serde_json::Value;

/// Sibling view handed to computed defaults.
pub struct DefaultContext<'a> {
    siblings: &'a mut IndexMap<String, DataItem>,
    parent_path: &'a str,
    resolving: Vec<String>,
}

impl<'a> DefaultContext<'a> {
    pub(crate) fn new(siblings: &'a mut IndexMap<String, DataItem>, parent_path: &'a str) -> Self {
        Self {
            siblings,
            parent_path,
            resolving: Vec::new(),
        }
    }

    /// Exported value of a sibling, applying its default first if needed.
    pub fn get(&mut self, name: &str) -> Result<Value> {
        self.ensure(name)?;
        Ok(self
            .siblings
            .get(name)
            .map(DataItem::export)
            .unwrap_or(Value::Null))
    }

    /// A sibling's value as a string; empty if unset.
    pub fn get_str(&mut self, name: &str) -> Result<String> {
        Ok(match self.get(name)? {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
    }

    /// A sibling's value as a flag; false if unset.
    pub fn get_bool(&mut self, name: &str) -> Result<bool> {
        Ok(self.get(name)?.as_bool().unwrap_or(false))
    }

    /// Apply the default of `name` if it has not been evaluated yet.
    pub(crate) fn ensure(&mut self, name: &str) -> Result<()> {
        let default = match self.siblings.get(name) {
            Some(item) if item.needs_default() => item.definition().default.clone(),
            _ => return Ok(()),
        };
        let Some(default) = default else {
            return Ok(());
        };

        if self.resolving.iter().any(|n| n == name) {
            return Err(LogicError::DefaultCycle(format!("{}/{}", self.parent_path, name)).into());
        }

        self.resolving.push(name.to_string());
        let value = match default {
            DefaultValue::Literal(v) => Ok(v),
            DefaultValue::Computed(f) => f(self),
        };
        self.resolving.pop();
        let value = value?;

        if let Some(item) = self.siblings.get_mut(name) {
            item.mark_defaulted();
            if !value.is_null() {
                item.set(value).map_err(GenerationError::Input)?;
            }
        }
        Ok(())
    }
}
