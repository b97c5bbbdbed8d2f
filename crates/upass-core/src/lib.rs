//! `upass-core` — vault state machine and persistence/merge engine for uPass.
//!
//! Two cooperating components, composed by a thin [`VaultSession`]
//! controller:
//!
//! - [`AuthGate`] — a PIN state machine governing whether vault contents
//!   are visible
//! - [`VaultStore`] — an ordered credential snapshot with CRUD, filtered
//!   search, and an id-keyed merge for importing a foreign entry set
//!
//! Everything else (screens, gestures, clipboard, toasts, file pickers) is
//! host plumbing: persistence arrives through the [`Storage`] trait, and
//! user feedback leaves as [`AuthEvent`]s and [`ImportOutcome`] counts.
//! Single-user, single-process, local-only; stored values are plaintext by
//! design.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod auth;
pub mod entry;
pub mod error;
pub mod exchange;
pub mod session;
pub mod storage;
pub mod store;

pub use auth::{AuthEvent, AuthGate, AuthMode, PIN_LEN};
pub use entry::CredentialEntry;
pub use error::{StorageError, VaultError};
pub use exchange::ImportOutcome;
pub use session::VaultSession;
pub use storage::{FileStorage, MemoryStorage, Storage, ENTRIES_KEY, PIN_KEY};
pub use store::{DeleteOutcome, VaultStore};
