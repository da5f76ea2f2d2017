// SPDX-License-Identifier: GPL-3.0-or-later

//! Keyed storage for uploaded recordings.
//!
//! Every backend implements [`TrackStore`]:
//! - [`FileTrackStore`]: one file per track under an injected root directory
//! - [`MemoryTrackStore`]: in-process map, for tests and ephemeral setups
//! - [`TrackServiceClient`]: a remote track service reached over HTTP
//!
//! Tracks are write-once. A `put` on an existing key fails with
//! [`StoreError::AlreadyExists`]; replacing a track means delete then put.

pub mod error;
pub mod fs;
pub mod memory;
pub mod remote;

pub use error::{Result, StoreError, StoreErrorKind};
pub use fs::FileTrackStore;
pub use memory::MemoryTrackStore;
pub use remote::TrackServiceClient;

use addison_domain::{AudioPayload, TrackKey};
use async_trait::async_trait;

#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Whether a track is stored under `key`. Failures read as `false`.
    async fn exists(&self, key: &TrackKey) -> bool;

    async fn get(&self, key: &TrackKey) -> Result<AudioPayload>;

    /// Create a track. Fails with `AlreadyExists` rather than overwriting.
    async fn put(&self, key: &TrackKey, payload: AudioPayload) -> Result<()>;

    async fn delete(&self, key: &TrackKey) -> Result<()>;

    /// All stored keys, in no particular order.
    async fn list_keys(&self) -> Result<Vec<TrackKey>>;

    /// Create a track from a base64 transit encoding.
    ///
    /// An existing key is reported before the encoding is looked at.
    async fn put_encoded(&self, key: &TrackKey, encoded: &str) -> Result<()> {
        if self.exists(key).await {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }
        let payload = AudioPayload::from_base64(encoded)
            .map_err(|e| StoreError::InvalidPayload(e.to_string()))?;
        self.put(key, payload).await
    }
}
