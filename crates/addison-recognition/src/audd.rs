// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{RecognitionError, Result};
use crate::{ensure_not_empty, RawTitle, Recognizer};
use addison_domain::AudioPayload;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

const AUDD_API_URL: &str = "https://api.audd.io/recognize";
const USER_AGENT: &str = concat!("Addison/", env!("CARGO_PKG_VERSION"));

/// Song reported by the AudD recognition API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RecognizedSong {
    /// Song title, the value the rest of the pipeline keys tracks by.
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Release date as reported (usually YYYY-MM-DD).
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    /// Offset into the song where the sample was matched (MM:SS).
    #[serde(default)]
    pub timecode: Option<String>,
    #[serde(default)]
    pub song_link: Option<String>,
}

/// AudD API client. Credentials travel in the request body.
#[derive(Debug, Clone)]
pub struct AuddClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl AuddClient {
    /// Create a new AudD client.
    ///
    /// # Arguments
    /// * `api_token` - AudD API token sent with every request.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::builder(api_token).build()
    }

    /// Create a client builder for custom configuration.
    pub fn builder(api_token: impl Into<String>) -> AuddClientBuilder {
        AuddClientBuilder::new(api_token)
    }

    /// Send a sample to AudD and return the full song record.
    ///
    /// # Errors
    /// Returns:
    /// - `InvalidPayload` if the sample is empty (nothing is sent).
    /// - `NoMatch` if AudD answers successfully without a song.
    /// - `ProviderError` for non-2xx responses or `status: "error"` bodies.
    /// - `SerializationError` if the body is not the expected JSON.
    pub async fn recognize_song(&self, payload: &AudioPayload) -> Result<RecognizedSong> {
        ensure_not_empty(payload)?;

        let request = RecognizeRequest {
            api_token: &self.api_token,
            audio: payload.to_base64(),
        };

        debug!(target: "recognition", bytes = payload.len(), "AudD recognize request");

        let response = self
            .client
            .post(self.base_url.as_str())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!(target: "recognition", "AudD response status: {}", status);

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RecognitionError::ProviderError(format!(
                "HTTP {}: {}",
                status, message
            )));
        }

        let body = response.text().await?;
        trace!(target: "recognition", "AudD response: {}", body);

        let api_response: AuddResponse = serde_json::from_str(&body)?;

        if !api_response.status.eq_ignore_ascii_case("success") {
            let message = api_response
                .error
                .and_then(|e| e.describe())
                .unwrap_or_else(|| format!("unexpected status '{}'", api_response.status));
            return Err(RecognitionError::ProviderError(message));
        }

        let song = api_response.result.ok_or(RecognitionError::NoMatch)?;
        let has_title = song
            .title
            .as_deref()
            .is_some_and(|title| !title.trim().is_empty());
        if !has_title {
            return Err(RecognitionError::NoMatch);
        }

        Ok(song)
    }
}

#[async_trait]
impl Recognizer for AuddClient {
    async fn recognize(&self, payload: &AudioPayload) -> Result<RawTitle> {
        let song = self.recognize_song(payload).await?;
        song.title.ok_or(RecognitionError::NoMatch)
    }
}

#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    api_token: &'a str,
    audio: String,
}

/// AudD API response structure.
#[derive(Debug, Deserialize)]
struct AuddResponse {
    status: String,
    #[serde(default)]
    result: Option<RecognizedSong>,
    #[serde(default)]
    error: Option<AuddApiError>,
}

#[derive(Debug, Deserialize)]
struct AuddApiError {
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_message: Option<String>,
}

impl AuddApiError {
    fn describe(self) -> Option<String> {
        match (self.error_code, self.error_message) {
            (Some(code), Some(message)) => Some(format!("{} (code {})", message, code)),
            (None, Some(message)) => Some(message),
            (Some(code), None) => Some(format!("code {}", code)),
            (None, None) => None,
        }
    }
}

/// Builder for AudD client.
#[derive(Debug)]
pub struct AuddClientBuilder {
    api_token: String,
    base_url: String,
    timeout: Duration,
}

impl AuddClientBuilder {
    /// Create a new builder.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: AUDD_API_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the full recognize endpoint URL (useful for testing).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the AudD client.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The base URL is not a valid URL format
    /// - The HTTP client cannot be created
    pub fn build(self) -> Result<AuddClient> {
        Url::parse(&self.base_url)
            .map_err(|e| RecognitionError::Configuration(format!("Invalid base URL: {}", e)))?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(AuddClient {
            client,
            base_url: self.base_url,
            api_token: self.api_token,
        })
    }
}
