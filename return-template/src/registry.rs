//! Immutable lookup table from project type to template.
//!
//! Built once at startup and passed to the components that need it. A
//! template that fails to parse is a deployment error and aborts
//! construction; looking up an unknown type is not an error.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::schema::SchemaError;
use crate::template::Template;

/// Project types shipped with the crate and their schema documents.
pub const BUILTIN_TYPES: &[(&str, &str)] = &[
    ("hif", include_str!("../templates/hif.json")),
    ("ac", include_str!("../templates/ac.json")),
    ("ff", include_str!("../templates/ff.json")),
];

/// Registry of known templates keyed by project type.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, Arc<Template>>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry of the built-in project types.
    pub fn builtin() -> Result<Self, SchemaError> {
        let templates = BUILTIN_TYPES
            .iter()
            .map(|(template_type, text)| Template::from_json_str(*template_type, text))
            .collect::<Result<Vec<_>, _>>()?;

        let registry = Self::from_templates(templates);
        info!(count = registry.len(), "Loaded built-in templates");
        Ok(registry)
    }

    /// Registry of the given templates; later duplicates replace earlier ones.
    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let templates = templates
            .into_iter()
            .map(|template| (template.template_type().to_string(), Arc::new(template)))
            .collect();
        Self { templates }
    }

    /// Load every `<type>.json` document in a directory.
    pub fn load_dir(dir: &Path) -> Result<Self, SchemaError> {
        let io_error = |source| SchemaError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut templates = Vec::with_capacity(files.len());
        for path in files {
            let Some(template_type) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let text = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(template_type, path = %path.display(), "Loading template");
            templates.push(Template::from_json_str(template_type, &text)?);
        }

        let registry = Self::from_templates(templates);
        info!(count = registry.len(), dir = %dir.display(), "Loaded templates from directory");
        Ok(registry)
    }

    /// Merge `overrides` into this registry; overriding templates win.
    pub fn with_overrides(mut self, overrides: TemplateRegistry) -> Self {
        for (template_type, template) in overrides.templates {
            if self.templates.contains_key(&template_type) {
                debug!(template_type = %template_type, "Overriding template");
            }
            self.templates.insert(template_type, template);
        }
        self
    }

    /// Find the template for a project type.
    pub fn lookup(&self, template_type: &str) -> Option<Arc<Template>> {
        self.templates.get(template_type).cloned()
    }

    pub fn contains(&self, template_type: &str) -> bool {
        self.templates.contains_key(template_type)
    }

    /// Registered types, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
