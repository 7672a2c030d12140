use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PilotConfig {
    pub log: LogConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub retrieval: RetrievalConfig,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub base_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// `openai` or `hash`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bucket count for the `hash` provider.
    pub hash_dimensions: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    /// `openai` or `static`.
    pub provider: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Reply returned by the `static` provider.
    pub static_reply: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    pub default_k: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct CredentialsConfig {
    pub openai_api_key: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let base_dir = default_data_dir()
            .join("store")
            .to_string_lossy()
            .into_owned();
        Self { base_dir }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "text-embedding-ada-002".into(),
            base_url: "https://api.openai.com/v1".into(),
            timeout_secs: 30,
            hash_dimensions: 256,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-3.5-turbo".into(),
            base_url: "https://api.openai.com/v1".into(),
            temperature: 0.0,
            max_tokens: 512,
            timeout_secs: 60,
            static_reply: "This is a static answer.".into(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_k: 5 }
    }
}

/// Returns the platform data directory for promptpilot, e.g. `~/.local/share/promptpilot`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptpilot")
}

/// Returns the default config file path, e.g. `~/.config/promptpilot/config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(default_data_dir)
        .join("promptpilot")
        .join("config.toml")
}

impl PilotConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            PilotConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `OPENAI_API_KEY`, `OPENAI_MODEL_NAME`, `PROMPTPILOT_STORE`,
    /// `PROMPTPILOT_LOG_LEVEL`, `PROMPTPILOT_EMBEDDING_PROVIDER`.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.credentials.openai_api_key = Some(val);
        }
        if let Ok(val) = std::env::var("OPENAI_MODEL_NAME") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("PROMPTPILOT_STORE") {
            self.storage.base_dir = val;
        }
        if let Ok(val) = std::env::var("PROMPTPILOT_LOG_LEVEL") {
            self.log.level = val;
        }
        if let Ok(val) = std::env::var("PROMPTPILOT_EMBEDDING_PROVIDER") {
            self.embedding.provider = val;
        }
    }

    /// Resolve the store base directory, expanding `~` if needed.
    pub fn resolved_store_dir(&self) -> PathBuf {
        expand_tilde(&self.storage.base_dir)
    }

    /// The API key with surrounding whitespace removed, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.credentials
            .openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PilotConfig::default();
        assert_eq!(config.log.level, "info");
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
        assert_eq!(config.retrieval.default_k, 5);
        assert!(config.storage.base_dir.ends_with("store"));
        assert!(config.credentials.openai_api_key.is_none());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[log]
level = "debug"

[storage]
base_dir = "/tmp/pilot-store"

[embedding]
provider = "hash"
hash_dimensions = 64

[credentials]
openai_api_key = "sk-test"
"#;
        let config: PilotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.storage.base_dir, "/tmp/pilot-store");
        assert_eq!(config.embedding.provider, "hash");
        assert_eq!(config.embedding.hash_dimensions, 64);
        assert_eq!(config.api_key(), Some("sk-test"));
        // defaults still apply for unset fields
        assert_eq!(config.embedding.model, "text-embedding-ada-002");
        assert_eq!(config.llm.max_tokens, 512);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut config = PilotConfig::default();
        config.credentials.openai_api_key = Some("   ".into());
        assert_eq!(config.api_key(), None);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = PilotConfig::load_from(tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.retrieval.default_k, 5);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[log\nlevel = ").unwrap();
        assert!(PilotConfig::load_from(&path).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = PilotConfig::default();
        std::env::set_var("PROMPTPILOT_STORE", "/tmp/override-store");
        std::env::set_var("PROMPTPILOT_LOG_LEVEL", "trace");
        std::env::set_var("OPENAI_MODEL_NAME", "gpt-4");

        config.apply_env_overrides();

        assert_eq!(config.storage.base_dir, "/tmp/override-store");
        assert_eq!(config.log.level, "trace");
        assert_eq!(config.llm.model, "gpt-4");

        // Clean up
        std::env::remove_var("PROMPTPILOT_STORE");
        std::env::remove_var("PROMPTPILOT_LOG_LEVEL");
        std::env::remove_var("OPENAI_MODEL_NAME");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/store"), PathBuf::from("/var/store"));
    }
}
