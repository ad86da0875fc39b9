//! Configuration management for the exit workflow system

use crate::error::{ExitflowError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitflowConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    pub mailer: MailerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(alias = "path", default = "default_data_dir")]
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    #[serde(alias = "url")] // Accept both 'base_url' and 'url'
    pub base_url: String,

    #[serde(alias = "token")] // Accept both 'api_key' and 'token'
    pub api_key: String,

    /// From-address for workflow mails
    pub sender: String,

    #[serde(default = "default_mailer_enabled")]
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

// Default functions
fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "/data/exitflow".to_string()
}

fn default_mailer_enabled() -> bool {
    true
}

impl ExitflowConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ExitflowError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ExitflowError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.directory.data_dir.is_empty() {
            return Err(ExitflowError::Config(
                "Directory data_dir is required".to_string(),
            ));
        }

        if self.mailer.enabled {
            if self.mailer.base_url.is_empty() {
                return Err(ExitflowError::Config(
                    "Mailer base_url is required when mailer is enabled".to_string(),
                ));
            }
            if self.mailer.api_key.is_empty() {
                return Err(ExitflowError::Config(
                    "Mailer API key is required when mailer is enabled".to_string(),
                ));
            }
            if self.mailer.sender.is_empty() {
                return Err(ExitflowError::Config(
                    "Mailer sender address is required when mailer is enabled".to_string(),
                ));
            }
        }

        Ok(())
    }
}
