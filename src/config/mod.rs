use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};
use crate::llm::LlmConfig;

/// Settings for the content approval service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerSettings,

    /// Content generator settings
    #[serde(default)]
    pub generator: GeneratorSettings,

    /// Publisher settings
    #[serde(default)]
    pub publisher: PublisherSettings,

    /// Logger settings
    #[serde(default)]
    pub logger: LoggerSettings,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Which generator backs content creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorMode {
    /// Canned templates
    #[default]
    Template,
    /// Language model
    Llm,
}

/// Content generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorSettings {
    /// Generator backend
    #[serde(default)]
    pub mode: GeneratorMode,

    /// Platform the post is written for
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Maximum post length in characters
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Deadline for a single generation, in seconds
    #[serde(default = "default_generate_timeout")]
    pub timeout_secs: u64,

    /// LLM settings, used in `llm` mode
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            mode: GeneratorMode::default(),
            platform: default_platform(),
            max_chars: default_max_chars(),
            timeout_secs: default_generate_timeout(),
            llm: LlmConfig::default(),
        }
    }
}

impl GeneratorSettings {
    /// Generation deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Which publisher delivers approved content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherMode {
    /// Fabricate results without contacting the platform
    #[default]
    DryRun,
    /// Post to the Twitter/X API
    Twitter,
}

/// Publisher settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublisherSettings {
    /// Publisher backend
    #[serde(default)]
    pub mode: PublisherMode,

    /// Destination identifier
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Base URL of the platform API
    #[serde(default = "default_twitter_api_url")]
    pub api_url: String,

    /// Bearer token for the platform API
    #[serde(default, skip_serializing)]
    pub bearer_token: Option<String>,

    /// Deadline for a single publish attempt, in seconds
    #[serde(default = "default_publish_timeout")]
    pub timeout_secs: u64,
}

impl Default for PublisherSettings {
    fn default() -> Self {
        Self {
            mode: PublisherMode::default(),
            platform: default_platform(),
            api_url: default_twitter_api_url(),
            bearer_token: None,
            timeout_secs: default_publish_timeout(),
        }
    }
}

impl PublisherSettings {
    /// Publish deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Colored console output
    #[serde(default = "default_true")]
    pub enable_console: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            enable_console: true,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_platform() -> String {
    crate::publisher::DEFAULT_PLATFORM.to_string()
}

fn default_max_chars() -> usize {
    crate::generator::MAX_POST_CHARS
}

fn default_generate_timeout() -> u64 {
    60
}

fn default_publish_timeout() -> u64 {
    30
}

fn default_twitter_api_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Settings {
    /// Apply overrides from environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {}", port)))?;
        }

        if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
            self.generator.llm.api_key = Some(key);
        }

        if let Some(token) = lookup("TWITTER_BEARER_TOKEN").filter(|t| !t.is_empty()) {
            self.publisher.bearer_token = Some(token);
        }

        if let Some(flag) = lookup("CONTENT_APPROVAL_DRY_RUN") {
            match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => self.publisher.mode = PublisherMode::DryRun,
                "0" | "false" | "no" | "" => {}
                other => {
                    return Err(Error::Config(format!(
                        "CONTENT_APPROVAL_DRY_RUN must be a boolean, got {}",
                        other
                    )))
                }
            }
        }

        Ok(())
    }

    /// Check that the selected backends have what they need
    pub fn validate(&self) -> Result<()> {
        if self.generator.max_chars == 0 {
            return Err(Error::Config("generator.max_chars must be positive".to_string()));
        }
        if self.generator.mode == GeneratorMode::Llm && self.generator.llm.api_key.is_none() {
            return Err(Error::Config(
                "ANTHROPIC_API_KEY not found in configuration or environment".to_string(),
            ));
        }
        if self.publisher.mode == PublisherMode::Twitter && self.publisher.bearer_token.is_none() {
            return Err(Error::Config(
                "TWITTER_BEARER_TOKEN not found in configuration or environment".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse settings from YAML text
pub fn parse_settings(contents: &str) -> Result<Settings> {
    Ok(serde_yaml::from_str(contents)?)
}

/// Load settings from a YAML file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let mut file = File::open(path)
        .map_err(|e| Error::Config(format!("Failed to open config file: {}", e)))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

    parse_settings(&contents)
}

/// Get settings, optionally from a specific file
pub fn get_settings(config_path: Option<&str>) -> Result<Settings> {
    match config_path {
        Some(path) => load_settings(path),
        None => {
            // Try to find config file in common locations
            let default_paths = [
                "content_approval.config.yaml",
                "config/content_approval.config.yaml",
            ];

            for path in default_paths {
                if Path::new(path).exists() {
                    debug!("Loading settings from {}", path);
                    return load_settings(path);
                }
            }

            Ok(Settings::default())
        }
    }
}
