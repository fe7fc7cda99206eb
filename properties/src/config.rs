use crate::path::PropertyPath;
use crate::tree::SetOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Accessor behavior, loaded from TOML:
///
/// ```toml
/// separator = "."
/// create_missing_parents = false
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PropertiesConfig {
    /// Character splitting dot-paths into segments.
    pub separator: char,
    /// Create missing intermediate objects/arrays on write. Off by default:
    /// writing below a missing parent is an error.
    pub create_missing_parents: bool,
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            separator: PropertyPath::SEPARATOR,
            create_missing_parents: false,
        }
    }
}

impl PropertiesConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse properties config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse_path(&self, raw: &str) -> PropertyPath {
        PropertyPath::parse_with(raw, self.separator)
    }

    pub fn set_options(&self) -> SetOptions {
        SetOptions {
            create_missing_parents: self.create_missing_parents,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PropertiesConfig::from_toml_str("").unwrap();

        assert_eq!(config, PropertiesConfig::default());
        assert_eq!(config.separator, '.');
        assert!(!config.set_options().create_missing_parents);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = PropertiesConfig::from_toml_str("create_missing_parents = true").unwrap();

        assert_eq!(config.separator, '.');
        assert!(config.set_options().create_missing_parents);
    }

    #[test]
    fn test_custom_separator_parses_paths() {
        let config = PropertiesConfig::from_toml_str(r#"separator = "/""#).unwrap();

        assert_eq!(config.parse_path("a/b.c").len(), 2);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(PropertiesConfig::from_toml_str(r#"separator = "too long""#).is_err());
        assert!(PropertiesConfig::from_toml_str("create_missing_parents = 3").is_err());
    }

    #[test]
    fn test_load_missing_file_reports_path() {
        let error = PropertiesConfig::load(Path::new("/nonexistent/properties.toml")).unwrap_err();
        assert!(error.to_string().contains("/nonexistent/properties.toml"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("properties-config-{}.toml", std::process::id()));
        std::fs::write(&path, "separator = \":\"\ncreate_missing_parents = true\n").unwrap();

        let config = PropertiesConfig::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.separator, ':');
        assert!(config.create_missing_parents);
    }
}
