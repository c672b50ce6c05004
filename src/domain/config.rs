use std::path::Path;

use serde::{Deserialize, Serialize};

/// Client configuration.
///
/// Stored as versioned TOML so the file format can evolve without breaking
/// existing installations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Base URL of the records API, without a trailing slash.
    ///
    /// Collection routes such as `/owners/` are appended to it.
    api_url: String,

    /// Whether deleting an owner also deletes the owner's vehicles.
    ///
    /// Off by default: the backend keeps vehicles whose owner has been
    /// removed, and views render their owner as `N/A`.
    pub cascade_owner_delete: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            cascade_owner_delete: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration, falling back to the defaults if the file is
    /// missing or unreadable.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::debug!("Using default configuration: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the base URL of the records API.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Sets the base URL of the records API.
    ///
    /// Trailing slashes are removed so routes can be appended directly.
    pub fn set_api_url(&mut self, url: &str) {
        self.api_url = url.trim_end_matches('/').to_string();
    }
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_api_url")]
        api_url: String,

        #[serde(default)]
        cascade_owner_delete: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                api_url,
                cascade_owner_delete,
            } => {
                let mut config = Self {
                    api_url: String::new(),
                    cascade_owner_delete,
                };
                config.set_api_url(&api_url);
                config
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            api_url: config.api_url,
            cascade_owner_delete: config.cascade_owner_delete,
        }
    }
}
