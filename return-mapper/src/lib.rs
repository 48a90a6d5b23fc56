//! Structural conversion between the core and UI shapes of a return.
//!
//! A [`StructuralMapper`] copies values along a list of
//! [`MappingPath`](return_template::MappingPath)s. A [`Converter`] pairs the
//! two directions for one template, and the [`ConverterCache`] builds
//! converters lazily per project type.
//!
//! Conversion never fails on missing data: a source path that does not
//! resolve is simply not written.

pub mod cache;
pub mod converter;
pub mod error;
pub mod mapper;

pub use cache::ConverterCache;
pub use converter::{Converter, Direction};
pub use error::{ensure_tree, MapperError};
pub use mapper::{apply, StructuralMapper};
