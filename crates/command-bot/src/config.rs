//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Talk server configuration
    pub talk: TalkConfig,

    /// Webhook server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Command storage configuration
    #[serde(default)]
    pub store: StoreConfig,

    /// Bot configuration
    #[serde(default)]
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TalkConfig {
    /// Nextcloud server URL, also expected as webhook backend
    pub backend_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON command store
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Enable persistence (if false, commands are in-memory only)
    #[serde(default = "default_true")]
    pub persist: bool,
}

#[derive(Debug, Deserialize)]
pub struct BotConfig {
    /// Bot name shown in Talk
    #[serde(default = "default_bot_name")]
    pub name: String,

    /// Public URL Talk posts webhooks to
    #[serde(default = "default_bot_url")]
    pub url: String,

    /// Description shown in Talk
    #[serde(default = "default_bot_description")]
    pub description: String,

    /// Shared secret; generated and stored at `secret_path` when unset
    #[serde(default)]
    pub secret: Option<SecretString>,

    /// Where a generated secret is kept
    #[serde(default = "default_secret_path")]
    pub secret_path: PathBuf,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// Default implementations
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            persist: default_true(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            url: default_bot_url(),
            description: default_bot_description(),
            secret: None,
            secret_path: default_secret_path(),
            log_level: default_log_level(),
        }
    }
}

// Default value functions
fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_listen_addr() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    8080
}

fn default_store_path() -> PathBuf {
    PathBuf::from("/data/commands.json")
}

fn default_true() -> bool {
    true
}

fn default_bot_name() -> String {
    "Command".into()
}

fn default_bot_url() -> String {
    "http://command-bot:8080/webhook".into()
}

fn default_bot_description() -> String {
    "Send a chat message \"!command\" to learn which commands and placeholders are available"
        .into()
}

fn default_secret_path() -> PathBuf {
    PathBuf::from("/data/secret")
}

fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(
            config::Environment::default()
                .separator("__")
                // Keep secrets and tokens as strings.
                .try_parsing(false),
        )
    }

    /// Build configuration from an environment source.
    pub fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> config::Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        config::Environment::default()
            .separator("__")
            .try_parsing(false)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_environment(environment(&[(
            "TALK__BACKEND_URL",
            "https://cloud.example.com",
        )]))
        .unwrap();

        assert_eq!(config.talk.backend_url, "https://cloud.example.com");
        assert_eq!(config.talk.timeout, Duration::from_secs(30));
        assert_eq!(config.server.port, 8080);
        assert!(config.store.persist);
        assert_eq!(config.bot.name, "Command");
        assert!(config.bot.secret.is_none());
        assert_eq!(config.bot.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_environment(environment(&[
            ("TALK__BACKEND_URL", "https://cloud.example.com"),
            ("TALK__TIMEOUT", "5s"),
            ("SERVER__PORT", "9000"),
            ("STORE__PERSIST", "false"),
            ("BOT__SECRET", "0123456789abcdef0123456789abcdef0123456789"),
        ]))
        .unwrap();

        assert_eq!(config.talk.timeout, Duration::from_secs(5));
        assert_eq!(config.server.port, 9000);
        assert!(!config.store.persist);
        assert_eq!(
            config.bot.secret.unwrap().expose_secret(),
            "0123456789abcdef0123456789abcdef0123456789"
        );
    }

    #[test]
    fn test_backend_url_required() {
        assert!(Config::from_environment(environment(&[])).is_err());
    }
}
