// SPDX-License-Identifier: GPL-3.0-or-later

//! FileTrackStore: one file per track.
//!
//! Layout:
//! ```text
//! {root}/
//! ├── Song+Title.wav
//! ├── Rock+n+Roll.wav
//! └── .Rock+n+Roll.4242.7.tmp   # in-flight write, never listed
//! ```
//!
//! Writes go to a hidden temporary file first and are published with
//! `hard_link`, which fails if the target exists. That gives readers only
//! complete files and lets exactly one of several racing writers win, also
//! across processes sharing the directory.
//!
//! The empty key is stored as `.{extension}`, or as [`EMPTY_KEY_FILE`] when
//! the extension is empty. Sanitized keys never start with a dot, so neither
//! name can clash with another key.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use addison_domain::{AudioPayload, TrackKey};
use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};
use crate::TrackStore;

/// File name of the empty key in a store without an extension.
pub const EMPTY_KEY_FILE: &str = ".empty-key";

#[derive(Debug)]
pub struct FileTrackStore {
    root: PathBuf,
    extension: String,
    next_staging_id: AtomicU64,
}

impl FileTrackStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// `extension` is appended to every key on disk (`wav` gives `key.wav`).
    /// An empty extension stores files under the bare key.
    pub async fn open(root: impl Into<PathBuf>, extension: impl Into<String>) -> Result<Self> {
        let root = root.into();
        let extension = extension.into().trim_start_matches('.').to_string();

        fs::create_dir_all(&root).await?;
        info!(target: "store", root = %root.display(), %extension, "file track store opened");

        Ok(Self {
            root,
            extension,
            next_staging_id: AtomicU64::new(0),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_name(&self, key: &TrackKey) -> String {
        if self.extension.is_empty() {
            if key.is_empty() {
                return EMPTY_KEY_FILE.to_string();
            }
            key.to_string()
        } else {
            format!("{}.{}", key, self.extension)
        }
    }

    fn track_path(&self, key: &TrackKey) -> PathBuf {
        self.root.join(self.file_name(key))
    }

    fn staging_path(&self, key: &TrackKey) -> PathBuf {
        let id = self.next_staging_id.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), id))
    }

    fn key_from_file_name(&self, name: &str) -> Option<TrackKey> {
        let stem = if self.extension.is_empty() {
            if name == EMPTY_KEY_FILE {
                return TrackKey::from_sanitized("");
            }
            name
        } else {
            name.strip_suffix(self.extension.as_str())?.strip_suffix('.')?
        };
        TrackKey::from_sanitized(stem)
    }
}

fn not_found_or_io(key: &TrackKey, err: std::io::Error) -> StoreError {
    if err.kind() == ErrorKind::NotFound {
        StoreError::NotFound(key.to_string())
    } else {
        StoreError::Io(err)
    }
}

async fn remove_staging(staging: &Path) {
    if let Err(e) = fs::remove_file(staging).await {
        if e.kind() != ErrorKind::NotFound {
            warn!(target: "store", path = %staging.display(), error = %e, "failed to remove staging file");
        }
    }
}

#[async_trait]
impl TrackStore for FileTrackStore {
    async fn exists(&self, key: &TrackKey) -> bool {
        fs::metadata(self.track_path(key))
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn get(&self, key: &TrackKey) -> Result<AudioPayload> {
        let data = fs::read(self.track_path(key))
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        debug!(target: "store", %key, bytes = data.len(), "read track");
        Ok(AudioPayload::from(data))
    }

    async fn put(&self, key: &TrackKey, payload: AudioPayload) -> Result<()> {
        let path = self.track_path(key);
        if self.exists(key).await {
            return Err(StoreError::AlreadyExists(key.to_string()));
        }

        let staging = self.staging_path(key);
        if let Err(e) = fs::write(&staging, payload.as_bytes()).await {
            remove_staging(&staging).await;
            return Err(StoreError::Io(e));
        }

        let published = fs::hard_link(&staging, &path).await;

        remove_staging(&staging).await;

        match published {
            Ok(()) => {
                info!(target: "store", %key, bytes = payload.len(), "track created");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(target: "store", %key, "lost race to create track");
                Err(StoreError::AlreadyExists(key.to_string()))
            }
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn delete(&self, key: &TrackKey) -> Result<()> {
        fs::remove_file(self.track_path(key))
            .await
            .map_err(|e| not_found_or_io(key, e))?;

        info!(target: "store", %key, "track deleted");
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<TrackKey>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut keys = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(key) = self.key_from_file_name(name) {
                keys.push(key);
            }
        }

        debug!(target: "store", count = keys.len(), "listed tracks");
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addison_domain::sanitize;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn open_store(dir: &TempDir) -> FileTrackStore {
        FileTrackStore::open(dir.path(), "wav").await.unwrap()
    }

    fn payload(bytes: &'static [u8]) -> AudioPayload {
        AudioPayload::from(bytes)
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let key = sanitize("Song Title");

        store.put(&key, payload(b"RIFF\x00\x01\xff")).await.unwrap();

        assert!(store.exists(&key).await);
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"RIFF\x00\x01\xff");
        assert!(dir.path().join("Song+Title.wav").is_file());
    }

    #[tokio::test]
    async fn put_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let key = sanitize("Song Title");

        store.put(&key, payload(b"first")).await.unwrap();
        let err = store.put(&key, payload(b"second")).await.unwrap_err();

        assert!(matches!(err, StoreError::AlreadyExists(_)));
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"first");
    }

    #[tokio::test]
    async fn delete_then_absent() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let key = sanitize("Gone");

        store.put(&key, payload(b"x")).await.unwrap();
        store.delete(&key).await.unwrap();

        assert!(!store.exists(&key).await);
        assert!(matches!(store.get(&key).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(&key).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        let err = store.get(&sanitize("Missing")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(ref k) if k == "Missing"));
    }

    #[tokio::test]
    async fn listing_reflects_puts_and_deletes() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert!(store.list_keys().await.unwrap().is_empty());

        store.put(&sanitize("One"), payload(b"1")).await.unwrap();
        store.put(&sanitize("Two Words"), payload(b"2")).await.unwrap();
        store.delete(&sanitize("One")).await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec![sanitize("Two Words")]);
    }

    #[tokio::test]
    async fn listing_skips_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("has space.wav"), b"x").unwrap();
        std::fs::write(dir.path().join(".Song.1.2.tmp"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested.wav")).unwrap();
        store.put(&sanitize("Kept"), payload(b"k")).await.unwrap();

        assert_eq!(store.list_keys().await.unwrap(), vec![sanitize("Kept")]);
    }

    #[tokio::test]
    async fn empty_key_is_a_valid_key() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let key = sanitize("''");

        store.put(&key, payload(b"degenerate")).await.unwrap();

        assert!(store.exists(&key).await);
        assert_eq!(store.list_keys().await.unwrap(), vec![key.clone()]);
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"degenerate");
    }

    #[tokio::test]
    async fn no_staging_files_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let key = sanitize("Clean");

        store.put(&key, payload(b"a")).await.unwrap();
        let _ = store.put(&key, payload(b"b")).await;

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["Clean.wav".to_string()]);
    }

    #[tokio::test]
    async fn concurrent_puts_have_one_winner() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_store(&dir).await);
        let key = sanitize("Contested");

        let mut handles = Vec::new();
        for i in 0..16u8 {
            let store = Arc::clone(&store);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                store.put(&key, AudioPayload::from(vec![i; 64])).await
            }));
        }

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(StoreError::AlreadyExists(_)) => conflicts += 1,
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 15);
        let stored = store.get(&key).await.unwrap();
        assert_eq!(stored.len(), 64);
        assert!(stored.as_bytes().iter().all(|b| *b == stored.as_bytes()[0]));
    }

    #[tokio::test]
    async fn put_encoded_rejects_bad_base64() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;
        let key = sanitize("Encoded");

        let err = store.put_encoded(&key, "%%%").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayload(_)));
        assert!(!store.exists(&key).await);

        store.put_encoded(&key, "UklGRg==").await.unwrap();
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"RIFF");
    }

    #[tokio::test]
    async fn stores_are_isolated_by_root() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        let a = open_store(&first).await;
        let b = open_store(&second).await;

        a.put(&sanitize("Only Here"), payload(b"a")).await.unwrap();

        assert!(!b.exists(&sanitize("Only Here")).await);
    }

    #[tokio::test]
    async fn extension_is_configurable() {
        let dir = TempDir::new().unwrap();
        let store = FileTrackStore::open(dir.path(), ".mp3").await.unwrap();

        store.put(&sanitize("Song"), payload(b"id3")).await.unwrap();

        assert!(dir.path().join("Song.mp3").is_file());
        assert_eq!(store.list_keys().await.unwrap(), vec![sanitize("Song")]);
    }

    #[tokio::test]
    async fn empty_key_without_extension_uses_reserved_name() {
        let dir = TempDir::new().unwrap();
        let store = FileTrackStore::open(dir.path(), "").await.unwrap();
        let key = sanitize("''");

        store.put(&key, payload(b"degenerate")).await.unwrap();
        store.put(&sanitize("Song"), payload(b"s")).await.unwrap();

        assert!(dir.path().join(EMPTY_KEY_FILE).is_file());
        assert!(dir.path().join("Song").is_file());
        assert_eq!(store.get(&key).await.unwrap().as_bytes(), b"degenerate");

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec![key.clone(), sanitize("Song")]);

        store.delete(&key).await.unwrap();
        assert!(!store.exists(&key).await);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_staging_file() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("tracks");
        let store = FileTrackStore::open(&root, "wav").await.unwrap();
        std::fs::remove_dir(&root).unwrap();

        let err = store.put(&sanitize("Lost"), payload(b"x")).await.unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert!(!root.exists());
    }
}
