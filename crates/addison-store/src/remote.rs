// SPDX-License-Identifier: GPL-3.0-or-later

use std::time::Duration;

use addison_domain::{AudioPayload, TrackKey};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Result, StoreError};
use crate::TrackStore;

/// [`TrackStore`] backed by a remote track service.
///
/// Routes: `GET /tracks`, and `GET`/`HEAD`/`PUT`/`DELETE /tracks/{key}`.
#[derive(Debug, Clone)]
pub struct TrackServiceClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Serialize, Deserialize)]
struct TrackDocument {
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "Audio")]
    audio: String,
}

#[derive(Debug, Deserialize)]
struct TrackListDocument {
    #[serde(rename = "trackIds", default)]
    track_ids: Vec<String>,
}

impl TrackServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Unavailable(format!("invalid track service URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Unavailable(format!(
                "invalid track service URL: {}",
                base_url
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, base_url })
    }

    fn url(&self, key: Option<&TrackKey>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("tracks");
            if let Some(key) = key {
                segments.push(key.as_str());
            }
        }
        url
    }

    async fn unexpected(response: Response) -> StoreError {
        let status = response.status();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        StoreError::Unavailable(format!("track service HTTP {}: {}", status, message))
    }
}

#[async_trait]
impl TrackStore for TrackServiceClient {
    async fn exists(&self, key: &TrackKey) -> bool {
        match self.client.head(self.url(Some(key))).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(target: "store", %key, error = %e, "track service unreachable");
                false
            }
        }
    }

    async fn get(&self, key: &TrackKey) -> Result<AudioPayload> {
        let response = self.client.get(self.url(Some(key))).send().await?;
        debug!(target: "store", %key, status = %response.status(), "track service get");

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            s if s.is_success() => {
                let body = response.text().await?;
                let document: TrackDocument = serde_json::from_str(&body).map_err(|e| {
                    StoreError::Unavailable(format!("malformed track document: {}", e))
                })?;
                AudioPayload::from_base64(&document.audio).map_err(|e| {
                    StoreError::Unavailable(format!("malformed track document: {}", e))
                })
            }
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn put(&self, key: &TrackKey, payload: AudioPayload) -> Result<()> {
        let document = TrackDocument {
            id: key.to_string(),
            audio: payload.to_base64(),
        };
        let response = self
            .client
            .put(self.url(Some(key)))
            .json(&document)
            .send()
            .await?;
        debug!(target: "store", %key, status = %response.status(), "track service put");

        match response.status() {
            StatusCode::CONFLICT => Err(StoreError::AlreadyExists(key.to_string())),
            StatusCode::BAD_REQUEST => {
                let message = response.text().await.unwrap_or_default();
                Err(StoreError::InvalidPayload(message))
            }
            s if s.is_success() => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn delete(&self, key: &TrackKey) -> Result<()> {
        let response = self.client.delete(self.url(Some(key))).send().await?;
        debug!(target: "store", %key, status = %response.status(), "track service delete");

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            s if s.is_success() => Ok(()),
            _ => Err(Self::unexpected(response).await),
        }
    }

    async fn list_keys(&self) -> Result<Vec<TrackKey>> {
        let response = self.client.get(self.url(None)).send().await?;
        if !response.status().is_success() {
            return Err(Self::unexpected(response).await);
        }

        let body = response.text().await?;
        let document: TrackListDocument = serde_json::from_str(&body)
            .map_err(|e| StoreError::Unavailable(format!("malformed track list: {}", e)))?;

        let mut keys = Vec::with_capacity(document.track_ids.len());
        for id in document.track_ids {
            match TrackKey::from_sanitized(&id) {
                Some(key) => keys.push(key),
                None => warn!(target: "store", id = %id, "skipping unsanitized key from track service"),
            }
        }
        Ok(keys)
    }
}
