//! Credential store — the ordered snapshot and its CRUD contract.
//!
//! The store owns the only live copy of the snapshot; the persistence
//! collaborator owns serialized bytes and nothing else. Every mutation is
//! persist-then-apply: the candidate snapshot is encoded and written
//! first, and the in-memory snapshot is replaced only once the write has
//! succeeded, so a [`VaultError::Persistence`] failure always leaves
//! memory consistent with the last committed bytes. `&mut self` receivers
//! serialize mutations — two writes can never race on one vault.

use std::collections::HashSet;
use std::mem;

use tracing::debug;
use zeroize::Zeroize;

use crate::entry::{generate_entry_id, CredentialEntry};
use crate::error::VaultError;
use crate::exchange::{self, ImportOutcome};
use crate::storage::{Storage, ENTRIES_KEY};

/// Outcome of a [`VaultStore::delete`] call.
///
/// Deleting an already-gone entry is idempotent — a successful no-op, not
/// an error. The distinction is reported so hosts can skip a redundant
/// confirmation toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The entry existed and was removed.
    Deleted,
    /// No entry had that id; the snapshot is unchanged.
    AlreadyAbsent,
}

/// The vault's credential collection, in insertion order.
#[derive(Debug)]
pub struct VaultStore<S> {
    storage: S,
    entries: Vec<CredentialEntry>,
}

impl<S: Storage> VaultStore<S> {
    /// Load the persisted snapshot, or start empty when none exists.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Decode`] if the stored bytes are unparseable or
    ///   contain duplicate ids — corrupt data is surfaced, never silently
    ///   discarded
    /// - [`VaultError::Persistence`] if the storage read fails
    pub fn load(storage: S) -> Result<Self, VaultError> {
        let entries = match storage.get(ENTRIES_KEY)? {
            None => Vec::new(),
            Some(bytes) => {
                let entries = exchange::decode_entries(&bytes).map_err(|e| match e {
                    VaultError::Format(msg) => VaultError::Decode(msg),
                    other => other,
                })?;
                ensure_unique_ids(&entries)?;
                entries
            }
        };

        debug!(count = entries.len(), "vault snapshot loaded");
        Ok(Self { storage, entries })
    }

    /// The current snapshot, in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CredentialEntry] {
        &self.entries
    }

    /// Number of entries in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a new entry with a fresh unique id and persist.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Validation`] if `name` or `value` is empty
    /// - [`VaultError::Persistence`] if the write fails (nothing applied)
    pub fn create(&mut self, name: &str, value: &str) -> Result<CredentialEntry, VaultError> {
        validate_fields(name, value)?;

        let entry = CredentialEntry {
            id: generate_entry_id(),
            name: name.to_owned(),
            value: value.to_owned(),
        };

        let mut next = self.entries.clone();
        next.push(entry.clone());
        self.commit(next)?;
        Ok(entry)
    }

    /// Replace an entry's `name` and `value` in place.
    ///
    /// The id and the entry's position in the snapshot are unchanged.
    ///
    /// # Errors
    ///
    /// - [`VaultError::EntryNotFound`] if no entry has `id`
    /// - [`VaultError::Validation`] if `name` or `value` is empty
    /// - [`VaultError::Persistence`] if the write fails (nothing applied)
    pub fn update(
        &mut self,
        id: &str,
        name: &str,
        value: &str,
    ) -> Result<CredentialEntry, VaultError> {
        validate_fields(name, value)?;

        let position = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_owned()))?;

        let mut next = self.entries.clone();
        let slot = next
            .get_mut(position)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_owned()))?;
        slot.name = name.to_owned();
        let mut previous = mem::replace(&mut slot.value, value.to_owned());
        previous.zeroize();
        let updated = slot.clone();

        self.commit(next)?;
        Ok(updated)
    }

    /// Remove the entry with `id`, if present.
    ///
    /// A missing id is a successful no-op that skips the redundant
    /// persist.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Persistence`] if the write fails (nothing
    /// applied).
    pub fn delete(&mut self, id: &str) -> Result<DeleteOutcome, VaultError> {
        if !self.entries.iter().any(|e| e.id == id) {
            return Ok(DeleteOutcome::AlreadyAbsent);
        }

        let next: Vec<CredentialEntry> = self
            .entries
            .iter()
            .filter(|e| e.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Replace the snapshot with an empty one and persist it.
    ///
    /// The "are you sure?" confirmation belongs at the host boundary, not
    /// here.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Persistence`] if the write fails (nothing
    /// applied).
    pub fn clear_all(&mut self) -> Result<(), VaultError> {
        self.commit(Vec::new())
    }

    /// Entries whose `name` contains `query`, case-insensitively.
    ///
    /// Lazy and restartable; an empty query yields every entry in
    /// snapshot order. Pure read — no persistence side effect.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CredentialEntry> + 'a {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(move |entry| entry.name.to_lowercase().contains(&needle))
    }

    /// Serialize the current snapshot for the transfer collaborator.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Format`] if encoding fails.
    pub fn export(&self) -> Result<Vec<u8>, VaultError> {
        exchange::encode_entries(&self.entries)
    }

    /// Merge a foreign entry list into the snapshot.
    ///
    /// Existing ids win — colliding incoming entries are dropped, never
    /// overwritten; the rest append in input order. The merged snapshot is
    /// committed as one atomic unit (skipped entirely when nothing was
    /// imported).
    ///
    /// # Errors
    ///
    /// - [`VaultError::Format`] if `bytes` is not a list of entry records
    /// - [`VaultError::Persistence`] if the write fails (nothing applied)
    pub fn import(&mut self, bytes: &[u8]) -> Result<ImportOutcome, VaultError> {
        let incoming = exchange::decode_entries(bytes)?;
        let (merged, outcome) = exchange::merge_entries(&self.entries, incoming);

        if outcome.imported > 0 {
            self.commit(merged)?;
        }

        debug!(
            imported = outcome.imported,
            skipped = outcome.skipped,
            "import merge completed"
        );
        Ok(outcome)
    }

    /// Persist-then-apply commit of a candidate snapshot.
    fn commit(&mut self, next: Vec<CredentialEntry>) -> Result<(), VaultError> {
        let bytes = exchange::encode_entries(&next)?;
        self.storage.set(ENTRIES_KEY, &bytes)?;
        self.entries = next;
        debug!(count = self.entries.len(), "vault snapshot committed");
        Ok(())
    }
}

/// Reject empty (or whitespace-only) required fields.
fn validate_fields(name: &str, value: &str) -> Result<(), VaultError> {
    if name.trim().is_empty() {
        return Err(VaultError::Validation("name must not be empty".into()));
    }
    if value.trim().is_empty() {
        return Err(VaultError::Validation("value must not be empty".into()));
    }
    Ok(())
}

/// Id uniqueness is an invariant of every committed snapshot; stored bytes
/// that violate it are treated as corrupt.
fn ensure_unique_ids(entries: &[CredentialEntry]) -> Result<(), VaultError> {
    let mut seen = HashSet::new();
    for entry in entries {
        if !seen.insert(entry.id.as_str()) {
            return Err(VaultError::Decode(format!(
                "duplicate entry id in stored snapshot: {}",
                entry.id
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
