// SPDX-License-Identifier: GPL-3.0-or-later
use std::sync::Arc;
use std::time::Duration;

use addison_config::AppConfig;
use addison_recognition::{AuddClient, Recognizer, SearchServiceClient};
use addison_store::{FileTrackStore, TrackServiceClient, TrackStore};
use anyhow::{Context, Result};
use tracing::{info, warn};

pub mod identify;

pub use identify::{IdentifyError, IdentifyResult, IdentifyService};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub recognizer: Arc<dyn Recognizer>,
    pub store: Arc<dyn TrackStore>,
    pub identify: Arc<IdentifyService>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        recognizer: Arc<dyn Recognizer>,
        store: Arc<dyn TrackStore>,
    ) -> Self {
        let identify = Arc::new(IdentifyService::new(
            Arc::clone(&recognizer),
            Arc::clone(&store),
            Duration::from_secs(config.identify.recognition_timeout_secs),
        ));
        Self {
            config,
            recognizer,
            store,
            identify,
        }
    }

    /// Build the recognizer and store named by `config` and wire them together.
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let recognizer = build_recognizer(&config)?;
        let store = build_store(&config).await?;
        Ok(Self::new(config, recognizer, store))
    }

    pub fn on_start(&self) {
        info!(target: "application", "application state initialized");
    }
}

fn build_recognizer(config: &AppConfig) -> Result<Arc<dyn Recognizer>> {
    let recognition = &config.recognition;
    let timeout = Duration::from_secs(recognition.timeout_secs);

    if let Some(remote_url) = &recognition.remote_url {
        info!(target: "application", url = %remote_url, "using remote search service");
        let client = SearchServiceClient::new(remote_url, timeout)
            .context("failed to build search service client")?;
        return Ok(Arc::new(client));
    }

    let api_token = match &recognition.api_token {
        Some(token) => token.clone(),
        None => {
            warn!(
                target: "application",
                "recognition.api_token is not set; provider requests will be rejected"
            );
            String::new()
        }
    };

    info!(target: "application", url = %recognition.provider_url, "using AudD recognition provider");
    let client = AuddClient::builder(api_token)
        .base_url(recognition.provider_url.clone())
        .timeout(timeout)
        .build()
        .context("failed to build AudD client")?;
    Ok(Arc::new(client))
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn TrackStore>> {
    let store = &config.store;

    if let Some(remote_url) = &store.remote_url {
        info!(target: "application", url = %remote_url, "using remote track service");
        let client = TrackServiceClient::new(remote_url, Duration::from_secs(store.timeout_secs))
            .context("failed to build track service client")?;
        return Ok(Arc::new(client));
    }

    let file_store = FileTrackStore::open(&store.root, store.extension.clone())
        .await
        .with_context(|| format!("failed to open track store at {}", store.root.display()))?;
    Ok(Arc::new(file_store))
}
