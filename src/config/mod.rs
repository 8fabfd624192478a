//! Configuration for the Despatch Bay client

use config::{Config, Environment, File};
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::error::DespatchResult;

/// Production API host
pub const DEFAULT_BASE_URL: &str = "https://api.despatchbay.com";

/// SOAP API version every namespace is pinned to
pub const DEFAULT_SOAP_VERSION: &str = "v15";

/// Documents (labels, manifest) API version
pub const DEFAULT_DOCUMENTS_VERSION: &str = "v1";

/// Client connection settings
///
/// All four SOAP sessions share the same credentials and base URL.
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub api_user: String,
    pub api_key: String,
    #[serde(default = "default_soap_version")]
    pub soap_version: String,
    #[serde(default = "default_documents_version")]
    pub documents_version: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_soap_version() -> String {
    DEFAULT_SOAP_VERSION.to_string()
}

fn default_documents_version() -> String {
    DEFAULT_DOCUMENTS_VERSION.to_string()
}

impl ClientConfig {
    /// Config with default endpoints for the given credentials
    pub fn new(api_user: impl Into<String>, api_key: impl Into<String>) -> Self {
        ClientConfig {
            base_url: default_base_url(),
            api_user: api_user.into(),
            api_key: api_key.into(),
            soap_version: default_soap_version(),
            documents_version: default_documents_version(),
        }
    }

    /// Point the client at a different host (staging, mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with DESPATCHBAY_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> DespatchResult<Self> {
        let config_dir = std::env::var("DESPATCHBAY_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // DESPATCHBAY_API_USER, DESPATCHBAY_API_KEY, ...
            .add_source(Environment::with_prefix("DESPATCHBAY").try_parsing(true));

        Ok(builder.build()?.try_deserialize()?)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_user", &self.api_user)
            .field("api_key", &"<redacted>")
            .field("soap_version", &self.soap_version)
            .field("documents_version", &self.documents_version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = ClientConfig::new("user", "secret");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.soap_version, "v15");
        assert_eq!(config.documents_version, "v1");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("user", "secret");
        let rendered = format!("{:?}", config);
        assert!(rendered.contains("user"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let config: ClientConfig = Config::builder()
            .set_override("api_user", "u")
            .unwrap()
            .set_override("api_key", "k")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api_user, "u");
    }

    // The only test that touches DESPATCHBAY_* variables
    #[test]
    fn test_load_layers_files_and_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "api_user = \"default-user\"\napi_key = \"default-key\"\nbase_url = \"https://default.example\"\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("local.toml"),
            "api_key = \"local-key\"\nbase_url = \"https://local.example\"\n",
        )
        .unwrap();

        std::env::set_var("DESPATCHBAY_CONFIG_PATH", dir.path());
        std::env::set_var("DESPATCHBAY_BASE_URL", "https://env.example");
        let result = ClientConfig::load();
        std::env::remove_var("DESPATCHBAY_CONFIG_PATH");
        std::env::remove_var("DESPATCHBAY_BASE_URL");

        let config = result.unwrap();
        assert_eq!(config.api_user, "default-user");
        assert_eq!(config.api_key, "local-key");
        assert_eq!(config.base_url, "https://env.example");
        assert_eq!(config.soap_version, DEFAULT_SOAP_VERSION);
        assert_eq!(config.documents_version, DEFAULT_DOCUMENTS_VERSION);
    }
}
