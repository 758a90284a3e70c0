use anyhow::{Context, Result};
use pagebuilder_markup::SerializeOptions;
use pagebuilder_stage::{MediaUrlResolver, Registry, DEFAULT_MEDIA_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

pub const DEFAULT_CONFIG_NAME: &str = "pagebuilder.config.json";

/// PageBuilder configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL that `{{media url=...}}` paths resolve against
    #[serde(default = "default_media_url")]
    pub media_url: String,

    /// Extra content type definition files, merged over the built-ins
    #[serde(default)]
    pub content_types: Vec<String>,

    /// Pretty-print written markup
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_media_url() -> String {
    DEFAULT_MEDIA_URL.to_string()
}

fn default_pretty() -> bool {
    true
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("reading {}", config_path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", config_path.display()))?;
            debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Built-in content types plus the configured definition files
    pub fn registry(&self, cwd: &Path) -> Result<Registry> {
        let assets = Rc::new(MediaUrlResolver::new(self.media_url.as_str()));
        let mut registry = Registry::builtin(assets)?;

        for path in self.content_type_paths(cwd) {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let count = registry
                .register_json(&json)
                .with_context(|| format!("registering content types from {}", path.display()))?;
            debug!(path = %path.display(), count, "registered content types");
        }

        Ok(registry)
    }

    pub fn content_type_paths(&self, cwd: &Path) -> Vec<PathBuf> {
        self.content_types.iter().map(|path| cwd.join(path)).collect()
    }

    pub fn serialize_options(&self, compact: bool) -> SerializeOptions {
        if compact || !self.pretty {
            SerializeOptions::compact()
        } else {
            SerializeOptions::pretty()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media_url: default_media_url(),
            content_types: vec![],
            pretty: default_pretty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "mediaUrl": "https://cdn.example.com/media/",
            "contentTypes": ["content-types/banner.json"],
            "pretty": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.media_url, "https://cdn.example.com/media/");
        assert_eq!(config.content_types, vec!["content-types/banner.json"]);
        assert!(!config.pretty);
        assert!(!config.serialize_options(false).pretty);
    }

    #[test]
    fn test_default_config() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.media_url, "/media/");
        assert!(config.serialize_options(false).pretty);
        assert!(!config.serialize_options(true).pretty);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = std::env::temp_dir().join("pagebuilder-config-missing");
        assert_eq!(Config::load(&dir).unwrap(), Config::default());
    }

    #[test]
    fn test_builtin_registry() {
        let registry = Config::default().registry(Path::new(".")).unwrap();
        assert!(registry.contains("row"));
        assert!(registry.contains("root-container"));
    }
}
