//! Return templates and schema copy-path resolution.
//!
//! A template is an authority-agnostic JSON Schema document describing the
//! shape of a return for one project type. Fields may carry a `sourceKey`
//! annotation naming the absolute path of the value in the paired (core)
//! representation. This crate:
//!
//! - parses the supported schema subset into a closed [`SchemaNode`] tree
//! - resolves the ordered list of [`MappingPath`]s described by the annotations
//! - records which destination prefixes are arrays ([`ArrayLayout`])
//! - keeps the immutable [`TemplateRegistry`] of known project types
//!
//! # Example
//!
//! ```ignore
//! use return_template::TemplateRegistry;
//!
//! let registry = TemplateRegistry::builtin()?;
//! let template = registry.lookup("hif").expect("hif is built in");
//! for path in template.copy_paths() {
//!     println!("{:?} <- {:?}", path.to, path.from);
//! }
//! ```

pub mod paths;
pub mod registry;
pub mod schema;
pub mod template;

pub use paths::{array_layout, infer_source_layout, resolve, ArrayLayout, MappingPath};
pub use registry::{TemplateRegistry, BUILTIN_TYPES};
pub use schema::{ArrayNode, Branch, DependencyNode, LeafNode, ObjectNode, SchemaError, SchemaNode};
pub use template::Template;
