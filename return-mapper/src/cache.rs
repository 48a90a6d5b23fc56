//! Lazily built converters, one per project type.

use std::sync::Arc;

use dashmap::DashMap;
use return_template::TemplateRegistry;
use serde_json::Value;
use tracing::debug;

use crate::converter::{Converter, Direction};

/// Converter lookup shared by every caller of a registry.
///
/// Templates never change after registration, so a converter built once is
/// valid for the life of the process.
pub struct ConverterCache {
    templates: Arc<TemplateRegistry>,
    converters: DashMap<String, Arc<Converter>>,
}

impl ConverterCache {
    pub fn new(templates: Arc<TemplateRegistry>) -> Self {
        Self {
            templates,
            converters: DashMap::new(),
        }
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    /// Converter for a project type.
    ///
    /// `None` when the type has no template, or when its template carries no
    /// `sourceKey`s. Payloads of such types are not converted.
    pub fn converter_for(&self, template_type: &str) -> Option<Arc<Converter>> {
        if let Some(converter) = self.converters.get(template_type) {
            return Some(Arc::clone(converter.value()));
        }

        let template = self.templates.lookup(template_type)?;
        if !template.is_mapped() {
            return None;
        }

        let converter = Arc::new(Converter::from_template(&template));
        debug!(
            template_type,
            paths = template.copy_paths().len(),
            "Built converter"
        );
        let entry = self
            .converters
            .entry(template_type.to_string())
            .or_insert(converter);
        Some(Arc::clone(entry.value()))
    }

    /// Convert `data`, or hand it back unchanged for unmapped types.
    pub fn convert(&self, template_type: &str, direction: Direction, data: Value) -> Value {
        match self.converter_for(template_type) {
            Some(converter) => converter.convert(direction, &data),
            None => {
                debug!(template_type, %direction, "No mapping for type, passing data through");
                data
            }
        }
    }

    /// Number of converters built so far.
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}
