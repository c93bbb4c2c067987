//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use veggie_lens_domain::policy::DEFAULT_MAX_UPLOAD_BYTES;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub recommendation: RecommendationConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Empty allows any origin
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_provider")]
    pub provider: String,

    #[serde(default = "default_classifier_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    /// When false, every prediction gets the degraded fallback
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_recommendation_provider")]
    pub provider: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub hosted: HostedConfig,

    #[serde(default)]
    pub local: LocalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostedConfig {
    #[serde(default = "default_hosted_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_hosted_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default = "default_local_base_url")]
    pub base_url: String,

    #[serde(default = "default_local_model")]
    pub model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite path or `sqlite:` URL; absent keeps history in-process only
    #[serde(default)]
    pub url: Option<String>,
}

// Default value functions
fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("./uploads")
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_classifier_provider() -> String {
    "http".to_string()
}

fn default_classifier_base_url() -> String {
    veggie_lens_adapters::classifier::http::DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_recommendation_provider() -> String {
    "auto".to_string()
}

fn default_locale() -> String {
    "id".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.4
}

fn default_max_output_tokens() -> u32 {
    800
}

fn default_hosted_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_hosted_base_url() -> String {
    veggie_lens_adapters::llm::openai_compat::DEFAULT_BASE_URL.to_string()
}

fn default_local_base_url() -> String {
    veggie_lens_adapters::llm::ollama::DEFAULT_BASE_URL.to_string()
}

fn default_local_model() -> String {
    "llama3.2".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            upload_dir: default_upload_dir(),
            max_upload_bytes: default_max_upload_bytes(),
            allowed_origins: vec![],
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: default_classifier_provider(),
            base_url: default_classifier_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            provider: default_recommendation_provider(),
            locale: default_locale(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout(),
            hosted: HostedConfig::default(),
            local: LocalConfig::default(),
        }
    }
}

impl Default for HostedConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_hosted_api_key_env(),
            base_url: default_hosted_base_url(),
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            model: default_local_model(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("VEGGIE_LENS")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# veggie-lens configuration
# Every key can be overridden with VEGGIE_LENS__SECTION__KEY, e.g.
# VEGGIE_LENS__RECOMMENDATION__PROVIDER=local

[server]
bind = "127.0.0.1:5000"
upload_dir = "./uploads"
max_upload_bytes = 10485760
# Empty allows any origin
allowed_origins = []

[classifier]
provider = "http"  # http, stub
base_url = "http://localhost:8000"
timeout_secs = 30

[recommendation]
enabled = true
provider = "auto"  # auto, hosted, local, stub
locale = "id"      # id, en
model = "gpt-4o-mini"
temperature = 0.4
max_output_tokens = 800
timeout_secs = 30

[recommendation.hosted]
api_key_env = "OPENAI_API_KEY"
base_url = "https://api.openai.com/v1"

[recommendation.local]
base_url = "http://localhost:11434"
model = "llama3.2"

[database]
# Omit to keep history in memory only
url = "./data/history.sqlite"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_toml_parses() {
        let parsed: AppConfig = toml::from_str(&AppConfig::example_toml()).unwrap();

        assert_eq!(parsed.server.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(parsed.recommendation.provider, "auto");
        assert_eq!(parsed.recommendation.local.model, "llama3.2");
        assert_eq!(
            parsed.database.url.as_deref(),
            Some("./data/history.sqlite")
        );
    }

    #[test]
    fn test_defaults_without_file() {
        let parsed: AppConfig = toml::from_str("").unwrap();

        assert_eq!(parsed.server.bind, "127.0.0.1:5000");
        assert_eq!(parsed.classifier.timeout_secs, 30);
        assert!(parsed.recommendation.enabled);
        assert_eq!(parsed.recommendation.locale, "id");
        assert!(parsed.database.url.is_none());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(AppConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[recommendation]\nprovider = \"stub\"\nlocale = \"en\"\n",
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.recommendation.provider, "stub");
        assert_eq!(config.recommendation.locale, "en");
        assert_eq!(config.classifier.provider, "http");
    }
}
