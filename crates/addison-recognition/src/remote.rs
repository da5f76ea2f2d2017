// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{RecognitionError, Result};
use crate::{ensure_not_empty, RawTitle, Recognizer};
use addison_domain::AudioPayload;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Client for a remote search service (`POST {base}/search`).
///
/// The service answers `{"Id": title}` on success and 404 when the provider
/// found nothing.
#[derive(Debug, Clone)]
pub struct SearchServiceClient {
    client: Client,
    search_url: Url,
}

#[derive(Debug, Serialize)]
struct SearchRequest {
    #[serde(rename = "Audio")]
    audio: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(rename = "Id")]
    id: String,
}

impl SearchServiceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut search_url = Url::parse(base_url)
            .map_err(|e| RecognitionError::Configuration(format!("Invalid base URL: {}", e)))?;
        search_url
            .path_segments_mut()
            .map_err(|_| {
                RecognitionError::Configuration(format!("Invalid base URL: {}", base_url))
            })?
            .pop_if_empty()
            .push("search");

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self { client, search_url })
    }
}

#[async_trait]
impl Recognizer for SearchServiceClient {
    async fn recognize(&self, payload: &AudioPayload) -> Result<RawTitle> {
        ensure_not_empty(payload)?;

        let response = self
            .client
            .post(self.search_url.clone())
            .json(&SearchRequest {
                audio: payload.to_base64(),
            })
            .send()
            .await?;

        let status = response.status();
        debug!(target: "recognition", url = %self.search_url, %status, "search service response");

        match status {
            StatusCode::NOT_FOUND => Err(RecognitionError::NoMatch),
            StatusCode::BAD_REQUEST => {
                let message = response.text().await.unwrap_or_default();
                Err(RecognitionError::InvalidPayload(message))
            }
            s if s.is_success() => {
                let body = response.text().await?;
                let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
                    RecognitionError::InvalidResponse(format!("malformed search response: {}", e))
                })?;
                Ok(parsed.id)
            }
            s => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(RecognitionError::ProviderError(format!(
                    "search service HTTP {}: {}",
                    s, message
                )))
            }
        }
    }
}
