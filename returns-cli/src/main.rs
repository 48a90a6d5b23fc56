//! returns: operator tool for project return templates
//!
//! ## Usage
//!
//! ```bash
//! # List registered project types
//! returns templates
//!
//! # Print the copy paths of the HIF template
//! returns paths hif
//!
//! # Convert a UI payload to its core shape
//! returns convert hif --direction ui-to-core return.json
//!
//! # Layer a directory of templates over the built-ins
//! returns --templates-dir ./templates templates
//! ```

mod commands;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use return_lifecycle::LifecycleConfig;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use commands::{execute, load_registry, Command};

#[derive(Parser, Debug)]
#[command(name = "returns")]
#[command(about = "Inspect return templates and convert return payloads")]
struct Cli {
    /// Path to a YAML lifecycle config file
    #[arg(short, long, env = "RETURNS_CONFIG")]
    config: Option<PathBuf>,

    /// Directory of <type>.json templates (overrides the config file)
    #[arg(long, env = "RETURNS_TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            let yaml = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            LifecycleConfig::from_yaml(&yaml)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => LifecycleConfig::default(),
    };

    // Apply CLI overrides
    if let Some(dir) = cli.templates_dir {
        config.templates_dir = Some(dir);
    }

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.log_level)?)
        .with_writer(std::io::stderr)
        .init();

    let registry = Arc::new(load_registry(config.templates_dir.as_deref())?);
    let output = execute(registry, cli.command)?;
    println!("{}", output);
    Ok(())
}

/// Targets whose events are shown at the configured level.
const LOG_TARGETS: [&str; 4] = ["returns", "return_template", "return_mapper", "return_lifecycle"];

fn log_directives(level: &str) -> Vec<String> {
    LOG_TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect()
}

/// `RUST_LOG` plus the configured level for this binary and its library crates.
fn log_filter(level: &str) -> anyhow::Result<EnvFilter> {
    let mut filter = EnvFilter::from_default_env();
    for directive in log_directives(level) {
        filter = filter.add_directive(
            directive
                .parse::<Directive>()
                .with_context(|| format!("Invalid log level {:?}", level))?,
        );
    }
    Ok(filter)
}
