//! Common utility functions.

pub mod data;
pub mod fs;
pub mod naming;

// Re-export commonly used items
pub use data::{get_path, load_yaml, load_yaml_file, overlay, save_yaml_file};
pub use fs::{expand_path, slurp};
pub use naming::{camel_case, pascal_case, readable_name, snake_case};
