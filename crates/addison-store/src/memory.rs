// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use addison_domain::{AudioPayload, TrackKey};
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::TrackStore;

/// In-memory track store. Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryTrackStore {
    tracks: RwLock<HashMap<TrackKey, AudioPayload>>,
}

impl MemoryTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store already holding `tracks`. Later duplicates are ignored.
    pub fn with_tracks(tracks: impl IntoIterator<Item = (TrackKey, AudioPayload)>) -> Self {
        let mut map = HashMap::new();
        for (key, payload) in tracks {
            map.entry(key).or_insert(payload);
        }
        Self {
            tracks: RwLock::new(map),
        }
    }

    pub async fn len(&self) -> usize {
        self.tracks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tracks.read().await.is_empty()
    }
}

#[async_trait]
impl TrackStore for MemoryTrackStore {
    async fn exists(&self, key: &TrackKey) -> bool {
        self.tracks.read().await.contains_key(key)
    }

    async fn get(&self, key: &TrackKey) -> Result<AudioPayload> {
        self.tracks
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &TrackKey, payload: AudioPayload) -> Result<()> {
        match self.tracks.write().await.entry(key.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(key.to_string())),
            Entry::Vacant(slot) => {
                debug!(target: "store", %key, bytes = payload.len(), "track created in memory");
                slot.insert(payload);
                Ok(())
            }
        }
    }

    async fn delete(&self, key: &TrackKey) -> Result<()> {
        self.tracks
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn list_keys(&self) -> Result<Vec<TrackKey>> {
        Ok(self.tracks.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addison_domain::sanitize;

    #[tokio::test]
    async fn round_trip_and_no_overwrite() {
        let store = MemoryTrackStore::new();
        let key = sanitize("Song Title");

        store.put(&key, AudioPayload::from(&b"p1"[..])).await.unwrap();
        let err = store
            .put(&key, AudioPayload::from(&b"p2"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert!(store.exists(&key).await);
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"p1");
    }

    #[tokio::test]
    async fn two_puts_one_delete_leaves_one_key() {
        let store = MemoryTrackStore::new();

        store.put(&sanitize("A"), AudioPayload::from(&b"a"[..])).await.unwrap();
        store.put(&sanitize("B"), AudioPayload::from(&b"b"[..])).await.unwrap();
        store.delete(&sanitize("A")).await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec![sanitize("B")]);
        assert!(!store.exists(&sanitize("A")).await);
        assert!(matches!(
            store.get(&sanitize("A")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let store = MemoryTrackStore::new();
        assert!(matches!(
            store.delete(&sanitize("Nope")).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn with_tracks_keeps_first_duplicate() {
        let key = sanitize("Dup");
        let store = MemoryTrackStore::with_tracks([
            (key.clone(), AudioPayload::from(&b"first"[..])),
            (key.clone(), AudioPayload::from(&b"second"[..])),
        ]);

        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"first");
    }

    #[tokio::test]
    async fn empty_key_is_a_valid_key() {
        let store = MemoryTrackStore::new();
        let key = sanitize("!!!");
        assert!(key.is_empty());

        store.put(&key, AudioPayload::from(&b"x"[..])).await.unwrap();

        assert!(store.exists(&key).await);
        assert_eq!(store.list_keys().await.unwrap(), vec![key.clone()]);
        store.delete(&key).await.unwrap();
        assert!(store.is_empty().await);
    }
}
