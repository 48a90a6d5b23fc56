//! Subcommands of the `returns` tool.
//!
//! Each command renders its output as a string so `main` decides where it
//! goes.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Subcommand;
use return_mapper::{ensure_tree, ConverterCache, Direction};
use return_template::TemplateRegistry;
use serde_json::Value;
use tracing::{debug, info};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered project types
    Templates,

    /// Print the template document of a project type
    Schema {
        /// Project type, e.g. hif
        project_type: String,
    },

    /// Print the copy paths resolved from a template
    Paths {
        /// Project type, e.g. hif
        project_type: String,
    },

    /// Convert a JSON payload between its core and UI shapes
    Convert {
        /// Project type, e.g. hif
        project_type: String,

        /// core-to-ui or ui-to-core
        #[arg(short, long)]
        direction: Direction,

        /// Payload file (reads standard input when omitted)
        file: Option<PathBuf>,
    },
}

/// Built-in templates, overridden by any found in `templates_dir`.
pub fn load_registry(templates_dir: Option<&Path>) -> anyhow::Result<TemplateRegistry> {
    let registry = TemplateRegistry::builtin().context("Built-in templates are invalid")?;
    let Some(dir) = templates_dir else {
        return Ok(registry);
    };

    let overrides = TemplateRegistry::load_dir(dir)
        .with_context(|| format!("Failed to load templates from {}", dir.display()))?;
    info!(dir = %dir.display(), count = overrides.len(), "Applied template overrides");
    Ok(registry.with_overrides(overrides))
}

pub fn execute(registry: Arc<TemplateRegistry>, command: Command) -> anyhow::Result<String> {
    match command {
        Command::Templates => Ok(registry.types().join("\n")),

        Command::Schema { project_type } => {
            let Some(template) = registry.lookup(&project_type) else {
                bail!("Unknown project type '{}'", project_type);
            };
            Ok(serde_json::to_string_pretty(template.document())?)
        }

        Command::Paths { project_type } => {
            let Some(template) = registry.lookup(&project_type) else {
                bail!("Unknown project type '{}'", project_type);
            };
            Ok(serde_json::to_string_pretty(template.copy_paths())?)
        }

        Command::Convert {
            project_type,
            direction,
            file,
        } => {
            if !registry.contains(&project_type) {
                bail!("Unknown project type '{}'", project_type);
            }
            let payload = read_payload(file.as_deref())?;
            ensure_tree(&payload)?;

            debug!(project_type = %project_type, %direction, "Converting payload");
            let converted = ConverterCache::new(registry).convert(&project_type, direction, payload);
            Ok(serde_json::to_string_pretty(&converted)?)
        }
    }
}

fn read_payload(file: Option<&Path>) -> anyhow::Result<Value> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read standard input")?;
            text
        }
    };
    serde_json::from_str(&text).context("Payload is not valid JSON")
}
