//! # Hookwright Data
//!
//! The typed data model that generator requests are expressed in.
//!
//! A component type declares its request schema as a tree of
//! [`PropertyDefinition`]s. Request data lives in a parallel tree of
//! [`DataItem`]s that validates values as they are set, evaluates defaults
//! lazily from sibling values, and merges losslessly with other items of the
//! same shape.

#![warn(missing_docs)]

pub mod defaults;
pub mod definition;
pub mod item;
pub mod merge;

pub use defaults::DefaultContext;
pub use definition::{
    DefaultFn, DefaultValue, OptionsFn, OptionsSource, PropertyDefinition, PropertySummary, ValidatorFn,
};
pub use item::DataItem;
pub use merge::merge_values;
