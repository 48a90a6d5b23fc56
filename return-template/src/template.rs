//! Registered template: a project type paired with its annotated schema.

use serde_json::Value;

use crate::paths::{array_layout, resolve, ArrayLayout, MappingPath};
use crate::schema::{SchemaError, SchemaNode};

/// An immutable template for one project type.
///
/// The raw document is kept next to the parsed tree so the exact schema can
/// be handed to front-end renderers and validators. Copy paths and the array
/// layout are derived once, at construction.
#[derive(Debug, Clone)]
pub struct Template {
    template_type: String,
    document: Value,
    schema: SchemaNode,
    paths: Vec<MappingPath>,
    layout: ArrayLayout,
}

impl Template {
    /// Build a template from a parsed JSON document.
    pub fn from_document(
        template_type: impl Into<String>,
        document: Value,
    ) -> Result<Self, SchemaError> {
        let template_type = template_type.into();
        let schema = SchemaNode::parse(&document).map_err(|source| SchemaError::InvalidTemplate {
            template_type: template_type.clone(),
            source: Box::new(source),
        })?;
        let paths = resolve(&schema);
        let layout = array_layout(&schema);

        Ok(Self {
            template_type,
            document,
            schema,
            paths,
            layout,
        })
    }

    /// Build a template from JSON text.
    pub fn from_json_str(template_type: impl Into<String>, text: &str) -> Result<Self, SchemaError> {
        let template_type = template_type.into();
        let document = serde_json::from_str(text).map_err(|source| SchemaError::Json {
            template_type: template_type.clone(),
            source,
        })?;
        Self::from_document(template_type, document)
    }

    /// The project type this template describes.
    pub fn template_type(&self) -> &str {
        &self.template_type
    }

    /// The schema document exactly as registered.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn schema(&self) -> &SchemaNode {
        &self.schema
    }

    /// Copy paths in schema declaration order.
    pub fn copy_paths(&self) -> &[MappingPath] {
        &self.paths
    }

    /// Schema positions that hold arrays.
    pub fn array_layout(&self) -> &ArrayLayout {
        &self.layout
    }

    /// Whether any field of the template carries a `sourceKey`.
    pub fn is_mapped(&self) -> bool {
        !self.paths.is_empty()
    }
}
