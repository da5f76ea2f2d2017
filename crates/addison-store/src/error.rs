// SPDX-License-Identifier: GPL-3.0-or-later

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Track not found: {0}")]
    NotFound(String),

    #[error("Track already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    NotFound,
    AlreadyExists,
    InvalidPayload,
    StorageUnavailable,
}

impl StoreErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "not_found",
            StoreErrorKind::AlreadyExists => "already_exists",
            StoreErrorKind::InvalidPayload => "invalid_payload",
            StoreErrorKind::StorageUnavailable => "storage_unavailable",
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            StoreError::NotFound(_) => StoreErrorKind::NotFound,
            StoreError::AlreadyExists(_) => StoreErrorKind::AlreadyExists,
            StoreError::InvalidPayload(_) => StoreErrorKind::InvalidPayload,
            StoreError::Io(_) | StoreError::RequestFailed(_) | StoreError::Unavailable(_) => {
                StoreErrorKind::StorageUnavailable
            }
        }
    }
}
