use markdown_rundoc_engine::highlight::DEFAULT_CSS_CLASS;
use markdown_rundoc_engine::{DEFAULT_SELECTION_TAG, HighlightConfig, SelectionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Selection filters as written in `config.toml`.
///
/// Tag lists are `#`-separated strings, e.g. `tags = "bash#setup"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tags: String,
    pub must_have_tags: String,
    pub must_not_have_tags: String,
    pub single_session: String,
    pub selection_tag: String,
    /// Present to enable highlighting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HighlightSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSection {
    pub css_class: String,
    pub linenums: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tags: String::new(),
            must_have_tags: String::new(),
            must_not_have_tags: String::new(),
            single_session: String::new(),
            selection_tag: DEFAULT_SELECTION_TAG.to_string(),
            highlight: None,
        }
    }
}

impl Default for HighlightSection {
    fn default() -> Self {
        Self {
            css_class: DEFAULT_CSS_CLASS.to_string(),
            linenums: false,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markdown-rundoc");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// The engine's view of the filters.
    pub fn selection(&self) -> SelectionConfig {
        SelectionConfig::default()
            .with_tags(&self.tags)
            .with_must_have_tags(&self.must_have_tags)
            .with_must_not_have_tags(&self.must_not_have_tags)
            .with_single_session(&self.single_session)
            .with_selection_tag(&self.selection_tag)
    }

    pub fn highlight_config(&self) -> Option<HighlightConfig> {
        self.highlight.as_ref().map(|section| HighlightConfig {
            css_class: section.css_class.clone(),
            linenums: section.linenums,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_rundoc_engine::TagSet;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn set(tags: &[&str]) -> TagSet {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        // Should not contain tilde anymore
        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/markdown-rundoc/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            tags: "bash#setup".to_string(),
            must_not_have_tags: "slow".to_string(),
            highlight: Some(HighlightSection::default()),
            ..Config::default()
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.selection(), SelectionConfig::default());
        assert_eq!(config.highlight_config(), None);
    }

    #[test]
    fn test_selection_from_toml() {
        let config: Config = toml::from_str(
            r#"
tags = "bash#setup"
must_have_tags = "db"
must_not_have_tags = "slow#flaky"
single_session = "bash"
selection_tag = "run-me"
"#,
        )
        .unwrap();

        let selection = config.selection();

        assert_eq!(selection.have_tags, set(&["bash", "setup"]));
        assert_eq!(selection.must_have_tags, set(&["db"]));
        assert_eq!(selection.must_not_have_tags, set(&["flaky", "slow"]));
        assert_eq!(selection.single_session.as_deref(), Some("bash"));
        assert_eq!(selection.selection_tag, "run-me");
    }

    #[test]
    fn test_empty_selection_tag_falls_back_to_default() {
        let config: Config = toml::from_str("selection_tag = \"\"").unwrap();
        assert_eq!(config.selection().selection_tag, DEFAULT_SELECTION_TAG);
    }

    #[test]
    fn test_highlight_section_enables_highlighting() {
        let config: Config = toml::from_str("[highlight]\nlinenums = true\n").unwrap();

        assert_eq!(
            config.highlight_config(),
            Some(HighlightConfig {
                css_class: DEFAULT_CSS_CLASS.to_string(),
                linenums: true,
            })
        );
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_config_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "tags = [").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            tags: "python".to_string(),
            single_session: "python".to_string(),
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
