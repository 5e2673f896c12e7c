use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::catalog;

/// Remembered form values, restored on the next launch
///
/// Credentials are deliberately absent; they are typed in per session.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FormDefaults {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    /// Two-letter country code from the catalog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// Category names in selection order
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Backend base URL; the /send path is appended by the client
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Show desktop notifications after a CLI send
    #[serde(default)]
    pub notifications: bool,

    /// Last submitted form values
    #[serde(default)]
    pub defaults: FormDefaults,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:5000".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            notifications: false,
            defaults: FormDefaults::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("newsbrief");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Drop values the catalog no longer recognizes before saving
        let mut clean_config = self.clone();

        if let Some(code) = &clean_config.defaults.country {
            if catalog::country_index(code).is_none() {
                clean_config.defaults.country = None;
            }
        }
        clean_config
            .defaults
            .categories
            .retain(|c| catalog::category(c).is_some());
        clean_config
            .defaults
            .categories
            .truncate(catalog::MAX_CATEGORIES);

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            endpoint: "http://news.example.com:5000".to_string(),
            notifications: true,
            defaults: FormDefaults {
                name: "Jon".to_string(),
                email: "jon@example.com".to_string(),
                country: Some("fr".to_string()),
                categories: vec!["World".to_string(), "Health".to_string()],
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config.endpoint, deserialized.endpoint);
        assert_eq!(config.defaults.country, deserialized.defaults.country);
        assert_eq!(config.defaults.categories, deserialized.defaults.categories);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.endpoint, "http://127.0.0.1:5000");
        assert!(!config.notifications);
        assert!(config.defaults.categories.is_empty());
    }

    #[test]
    fn test_credentials_never_serialized() {
        let serialized = toml::to_string_pretty(&AppConfig::default()).unwrap();

        assert!(!serialized.contains("api_key"));
        assert!(!serialized.contains("gmail"));
    }
}
