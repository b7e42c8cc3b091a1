//! Application configuration for ContextKeys.
//!
//! User config lives at `~/.contextkeys/contextkeys.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ContextKeysError, Result};
use crate::types::MergePolicy;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "contextkeys.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".contextkeys";

/// Prompt prefix placed before the document body.
pub const DEFAULT_PROMPT: &str =
    "Write a list of keywords in markdown formatting for the following text repeat keywords:\n";

// ---------------------------------------------------------------------------
// Config structs (matching contextkeys.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Text-generation backend settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Raise the default log level to debug.
    #[serde(default)]
    pub debug: bool,

    /// How stored and generated keywords are combined.
    #[serde(default)]
    pub merge_policy: MergePolicy,

    /// Print rewritten notes instead of saving them.
    #[serde(default)]
    pub dry_run: bool,
}

/// `[generation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of an OpenAI-compatible API (`/chat/completions` is appended).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for keyword generation.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on completion length.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Prompt prefix; the note body is appended after it.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            prompt: default_prompt(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_tokens() -> u32 {
    256
}
fn default_prompt() -> String {
    DEFAULT_PROMPT.into()
}

impl GenerationConfig {
    /// Parse and check `base_url`.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ContextKeysError::config(format!(
                "invalid generation.base_url '{}': {e}",
                self.base_url
            ))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ContextKeysError::config(format!(
                "generation.base_url must be http or https, got '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.contextkeys/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ContextKeysError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.contextkeys/contextkeys.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ContextKeysError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        ContextKeysError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.generation.base_url()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ContextKeysError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ContextKeysError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ContextKeysError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the API key from the env var named in the config.
pub fn resolve_api_key(config: &GenerationConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(ContextKeysError::config(format!(
            "API key not found. Set the {var_name} environment variable."
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("merge_policy = \"concatenate\""));
        assert!(toml_str.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.generation.timeout_secs, 60);
        assert_eq!(parsed.generation.prompt, DEFAULT_PROMPT);
        assert!(!parsed.defaults.dry_run);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
debug = true
merge_policy = "dedupe"

[generation]
model = "gpt-4o-mini"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert!(config.defaults.debug);
        assert_eq!(config.defaults.merge_policy, MergePolicy::Dedupe);
        assert_eq!(config.generation.model, "gpt-4o-mini");
        assert_eq!(config.generation.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[generation]\nbase_url = \"http://localhost:8080/v1\"\n")
            .expect("write config");

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.generation.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn load_config_rejects_bad_base_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[generation]\nbase_url = \"ftp://example.com\"\n")
            .expect("write config");

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("http or https"));
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.generation.api_key_env = "CK_TEST_NONEXISTENT_KEY_12345".into();
        let result = resolve_api_key(&config.generation);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
