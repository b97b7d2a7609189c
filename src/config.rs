//! Configuration loading.
//!
//! Settings come from a TOML file whose sections all have defaults, so a
//! missing file is equivalent to an empty one. Environment variables are
//! applied on top of the parsed file:
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `PORT` | Replaces the port of `[server].bind` |
//! | `EMAIL_USER` | Sender address (`[mail].from`) |
//! | `EMAIL_PASS` | Mail API key; enables the `http` mail provider |
//! | `ADMIN_EMAIL` | Recipient of new-lead notifications |

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use admitbot_core::store::memory::DEFAULT_HISTORY_CAPACITY;
use admitbot_core::trigger::LeadTriggers;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub triggers: LeadTriggers,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DocumentsConfig {
    #[serde(default = "default_documents_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    /// Descend into subdirectories of `dir`.
    #[serde(default)]
    pub recursive: bool,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: default_documents_dir(),
            include_globs: default_include_globs(),
            recursive: false,
        }
    }
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_include_globs() -> Vec<String> {
    vec!["*.txt".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
    /// Entries returned by `GET /api/chat/history` without `?limit=`.
    #[serde(default = "default_history_limit")]
    pub default_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            default_limit: default_history_limit(),
        }
    }
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}
fn default_history_limit() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// `memory` or `sqlite`.
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: default_db_path(),
        }
    }
}

fn default_backend() -> String {
    "memory".to_string()
}
fn default_db_path() -> PathBuf {
    PathBuf::from("./data/admitbot.sqlite")
}

impl StorageConfig {
    pub fn is_sqlite(&self) -> bool {
        self.backend == "sqlite"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// `disabled` or `http`.
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    /// Falls back to `from` when unset.
    #[serde(default)]
    pub admin: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_key: None,
            from: None,
            admin: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl MailConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Address that receives new-lead notifications.
    pub fn admin_address(&self) -> Option<&str> {
        self.admin.as_deref().or(self.from.as_deref())
    }
}

/// Environment variables consulted by [`Config::apply_env`].
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub port: Option<String>,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    pub admin_email: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            port: var("PORT"),
            email_user: var("EMAIL_USER"),
            email_pass: var("EMAIL_PASS"),
            admin_email: var("ADMIN_EMAIL"),
        }
    }
}

impl Config {
    /// Apply environment overrides on top of file settings.
    pub fn apply_env(&mut self, env: &EnvOverrides) -> Result<()> {
        if let Some(port) = &env.port {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", port))?;
            let host = self
                .server
                .bind
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.server.bind = format!("{}:{}", host, port);
        }
        if let Some(user) = &env.email_user {
            self.mail.from = Some(user.clone());
        }
        if let Some(pass) = &env.email_pass {
            self.mail.api_key = Some(pass.clone());
            if !self.mail.is_enabled() {
                self.mail.provider = "http".to_string();
            }
        }
        if let Some(admin) = &env.admin_email {
            self.mail.admin = Some(admin.clone());
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.history.capacity == 0 {
            bail!("history.capacity must be > 0");
        }

        match self.storage.backend.as_str() {
            "memory" | "sqlite" => {}
            other => bail!(
                "Unknown storage backend: '{}'. Must be memory or sqlite.",
                other
            ),
        }

        match self.mail.provider.as_str() {
            "disabled" => {}
            "http" => {
                if self.mail.api_key.is_none() {
                    bail!("mail.api_key (or EMAIL_PASS) must be set when mail.provider is 'http'");
                }
                if self.mail.from.is_none() {
                    bail!("mail.from (or EMAIL_USER) must be set when mail.provider is 'http'");
                }
            }
            other => bail!(
                "Unknown mail provider: '{}'. Must be disabled or http.",
                other
            ),
        }

        Ok(())
    }
}

/// Parse a TOML config string and validate it, without consulting the environment.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Load the config file at `path` (defaults if it does not exist), then
/// apply environment overrides and validate.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Config::default()
    };

    config.apply_env(&EnvOverrides::from_env())?;
    config.validate()?;
    Ok(config)
}
