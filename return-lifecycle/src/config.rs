//! Configuration for the return lifecycle.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Lifecycle policy and template source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Accept soft updates on returns that were already submitted
    pub allow_late_edits: bool,
    /// Return base returns in UI shape, passing the baseline or the latest
    /// submitted data through the core to UI converter
    pub seed_base_return_from_template: bool,
    /// Directory of `<type>.json` templates layered over the built-in set
    pub templates_dir: Option<PathBuf>,
    /// Default log filter for binaries
    pub log_level: String,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            allow_late_edits: true,
            seed_base_return_from_template: false,
            templates_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl LifecycleConfig {
    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Reject soft updates once a return is submitted.
    pub fn locked_after_submit(mut self) -> Self {
        self.allow_late_edits = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_permissive() {
        let config = LifecycleConfig::default();
        assert!(config.allow_late_edits);
        assert!(!config.seed_base_return_from_template);
        assert!(config.templates_dir.is_none());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = LifecycleConfig {
            templates_dir: Some(PathBuf::from("/etc/returns/templates")),
            ..LifecycleConfig::default().locked_after_submit()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(LifecycleConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = LifecycleConfig::from_yaml("allow_late_edits: false\n").unwrap();
        assert!(!config.allow_late_edits);
        assert_eq!(config.log_level, "info");
        assert!(config.templates_dir.is_none());
    }

    #[test]
    fn test_bad_yaml_is_an_error() {
        assert!(LifecycleConfig::from_yaml("allow_late_edits: [nope").is_err());
    }
}
