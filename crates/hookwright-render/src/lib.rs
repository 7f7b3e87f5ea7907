//! # Hookwright Render
//!
//! Generic structured-document writers used during file assembly:
//!
//! - [`YamlWriter`]: YAML with a configurable inlining depth and blank lines
//!   between entries contributed by different components
//! - [`Docblock`]: PHP docblocks with paragraph wrapping
//! - [`Annotation`]: plugin definitions as docblock annotations or attributes
//! - [`PhpClass`] and [`ProceduralFile`]: PHP file models
//! - [`PhpScanner`]: splits existing PHP files into mergeable pieces

#![warn(missing_docs)]

pub mod annotation;
pub mod docblock;
pub mod php;
pub mod scan;
pub mod yaml;

pub use annotation::{php_string, Annotation, AnnotationValue};
pub use docblock::Docblock;
pub use php::{short_class_name, ClassMember, ClassMetadata, MemberKind, PhpClass, PhpFunction, ProceduralFile};
pub use scan::{ParsedClass, ParsedProcedural, PhpScanner, Segment};
pub use yaml::YamlWriter;
