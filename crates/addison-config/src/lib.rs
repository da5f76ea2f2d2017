// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::{Path, PathBuf};

use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Environment variable naming an optional TOML configuration file.
pub const CONFIG_PATH_ENV: &str = "ADDISON_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body. Audio travels base64-encoded inside JSON.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3002,
            max_body_bytes: 64 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one file per track.
    pub root: PathBuf,
    /// File extension appended to every track key on disk.
    pub extension: String,
    /// Base URL of a remote track service. When set, the local directory is unused.
    pub remote_url: Option<String>,
    /// Request timeout for the remote track service.
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("tracks"),
            extension: "wav".to_string(),
            remote_url: None,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    pub provider_url: String,
    pub api_token: Option<String>,
    pub timeout_secs: u64,
    /// Base URL of a remote search service used instead of calling the provider directly.
    pub remote_url: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            provider_url: "https://api.audd.io/recognize".to_string(),
            api_token: None,
            timeout_secs: 30,
            remote_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyConfig {
    pub recognition_timeout_secs: u64,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            recognition_timeout_secs: 45,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub telemetry: TelemetryConfig,
    pub store: StoreConfig,
    pub recognition: RecognitionConfig,
    pub identify: IdentifyConfig,
}

/// Load configuration from defaults, optional TOML file, and environment overrides (prefix: ADDISON_).
pub fn load(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    if let Some(path) = config_path {
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed("ADDISON_").split("__"));

    let config: AppConfig = figment.extract()?;
    info!(target: "config", "configuration loaded");
    Ok(config)
}
