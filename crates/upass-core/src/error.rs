//! Error types for `upass-core`.

use thiserror::Error;

/// Errors produced by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error from the filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure (poisoned lock, quota, platform bridge).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors produced by vault operations.
///
/// `delete` of a missing id and duplicate skips during import are reported
/// outcomes, not errors — they never surface here. A PIN mismatch during
/// login is likewise a retryable [`crate::AuthEvent`], never an error.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A required field was empty.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation targeted an id that is not in the snapshot.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// Import payload is not a list of entry records.
    #[error("invalid import format: {0}")]
    Format(String),

    /// Persisted bytes could not be decoded back into vault state.
    #[error("stored vault data is corrupt: {0}")]
    Decode(String),

    /// The storage collaborator failed. The in-memory snapshot is left at
    /// the last successfully persisted state.
    #[error("persistence failure: {0}")]
    Persistence(#[from] StorageError),
}
