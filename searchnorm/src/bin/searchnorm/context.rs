use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use searchnorm::{FieldSchema, NormalizeOptions};

pub const CONFIG_FILE_NAME: &str = "searchnorm.toml";

/// Project context for searchnorm commands
#[derive(Debug, Default)]
pub struct ProjectContext {
    /// Path of the loaded config file, if any was found
    pub config_path: Option<PathBuf>,
    /// Loaded configuration (defaults when no file was found)
    pub config: ProjectConfig,
}

/// Configuration stored in searchnorm.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub normalize: NormalizeOptions,
    #[serde(default)]
    pub sort: SortSettings,
    #[serde(default)]
    pub text: TextSettings,
    #[serde(default)]
    pub schema: FieldSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSettings {
    #[serde(default = "default_locale")]
    pub locale: String,
}

impl Default for SortSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
        }
    }
}

fn default_locale() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextSettings {
    /// Fields searched by free-text queries when none are given on the command line
    #[serde(default)]
    pub fields: Vec<String>,
}

impl ProjectContext {
    /// Load the explicit config file, or look one up from the current directory
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let current_dir = std::env::current_dir().context("Failed to get current directory")?;
                Self::find_from(&current_dir)
            }
        }
    }

    /// Find searchnorm.toml in the given directory or its ancestors.
    /// Missing config is not an error: defaults apply.
    pub fn find_from(start: &Path) -> Result<Self> {
        match Self::find_config(start) {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("no {CONFIG_FILE_NAME} found from {start:?}, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a known file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ProjectConfig =
            toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))?;
        log::debug!("loaded configuration from {}", path.display());

        Ok(Self {
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    fn find_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Text-search fields: command line first, then configuration
    pub fn text_fields(&self, cli_fields: &[String]) -> Vec<String> {
        if cli_fields.is_empty() {
            self.config.text.fields.clone()
        } else {
            cli_fields.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProjectConfig::default();
        assert_eq!(config.sort.locale, "en");
        assert!(config.text.fields.is_empty());
        assert!(config.schema.is_empty());
        assert!(!config.normalize.no_regex);
    }

    #[test]
    fn test_config_parsing() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [normalize]
            match_from_start = true

            [sort]
            locale = "de"

            [text]
            fields = ["title", "description"]

            [schema.name]
            multi_language = true

            [schema.price]
            "#,
        )
        .unwrap();

        assert!(config.normalize.match_from_start);
        assert_eq!(config.sort.locale, "de");
        assert_eq!(config.text.fields, ["title", "description"]);
        assert!(config.schema.is_multi_language("name"));
        assert!(!config.schema.is_multi_language("price"));
    }

    #[test]
    fn test_find_walks_up_to_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "[sort]\nlocale = \"fr\"\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = ProjectContext::find_from(&nested).unwrap();
        assert_eq!(ctx.config.sort.locale, "fr");
        assert_eq!(ctx.config_path, Some(dir.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn test_find_without_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ProjectContext::find_from(dir.path()).unwrap();
        assert!(ctx.config_path.is_none());
        assert_eq!(ctx.config.sort.locale, "en");
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[sort\nlocale = ").unwrap();

        let err = ProjectContext::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn test_cli_fields_override_config() {
        let mut ctx = ProjectContext::default();
        ctx.config.text.fields = vec!["title".to_string()];
        assert_eq!(ctx.text_fields(&[]), ["title"]);
        assert_eq!(ctx.text_fields(&["body".to_string()]), ["body"]);
    }
}
