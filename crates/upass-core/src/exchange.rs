//! JSON exchange codec and id-keyed merge.
//!
//! The wire format is a self-describing JSON array of `{id, name, value}`
//! records — the same shape the vault persists, so the snapshot codec and
//! the import/export boundary share one implementation. The core's
//! responsibility ends at producing and consuming well-formed bytes; file
//! writers and share sheets belong to the host.

use std::collections::HashSet;

use crate::entry::CredentialEntry;
use crate::error::VaultError;

/// Counts reported after an import merge, for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Entries appended to the snapshot.
    pub imported: usize,
    /// Entries dropped because their id was already taken.
    pub skipped: usize,
}

/// Encode entries as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns [`VaultError::Format`] if serialization fails (not reachable
/// for well-formed entries; kept explicit rather than panicking).
pub(crate) fn encode_entries(entries: &[CredentialEntry]) -> Result<Vec<u8>, VaultError> {
    serde_json::to_vec_pretty(entries)
        .map_err(|e| VaultError::Format(format!("failed to encode entries: {e}")))
}

/// Decode a JSON array of entry records.
///
/// # Errors
///
/// Returns [`VaultError::Format`] if the payload is not a list of valid
/// entry records. Callers at the load path remap this to
/// [`VaultError::Decode`] since corrupt persisted bytes and a malformed
/// import file are different failures to the user.
pub(crate) fn decode_entries(bytes: &[u8]) -> Result<Vec<CredentialEntry>, VaultError> {
    serde_json::from_slice(bytes)
        .map_err(|e| VaultError::Format(format!("expected a list of entry records: {e}")))
}

/// Merge an incoming entry list into an existing snapshot.
///
/// Ids already present in `existing` win: colliding incoming entries are
/// dropped, never overwritten. Non-colliding entries append in input order
/// after the existing snapshot. An incoming entry whose id collides with
/// one appended earlier in the same batch is also skipped, keeping ids
/// unique in the merged result.
pub(crate) fn merge_entries(
    existing: &[CredentialEntry],
    incoming: Vec<CredentialEntry>,
) -> (Vec<CredentialEntry>, ImportOutcome) {
    let mut taken: HashSet<String> = existing.iter().map(|e| e.id.clone()).collect();
    let mut merged: Vec<CredentialEntry> = existing.to_vec();
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for entry in incoming {
        if taken.insert(entry.id.clone()) {
            merged.push(entry);
            imported = imported.saturating_add(1);
        } else {
            skipped = skipped.saturating_add(1);
        }
    }

    (merged, ImportOutcome { imported, skipped })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
