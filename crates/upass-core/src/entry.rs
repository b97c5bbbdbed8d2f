//! Credential entry model and id generation.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// A single named secret held by the vault.
///
/// The `id` is assigned at creation time and immutable thereafter; it is
/// the merge/dedup key for import. `name` and `value` are non-empty for
/// any entry committed through [`crate::VaultStore`], but an imported
/// payload is only required to parse — field content is taken as-is.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialEntry {
    /// Opaque unique identifier (UUIDv4 string).
    pub id: String,
    /// Display label, the case-insensitive search target.
    pub name: String,
    /// The secret string.
    pub value: String,
}

/// Wipe the secret when the entry goes out of scope.
///
/// Note: serde (de)serialization creates intermediate `String` values that
/// cannot be zeroized; this covers the primary in-memory lifetime of the
/// entry itself.
impl Drop for CredentialEntry {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

/// Redact the secret in debug output.
impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("value", &"****")
            .finish()
    }
}

/// Generate a fresh UUIDv4-style entry id from `OsRng`.
///
/// Random ids make collisions within a snapshot negligibly likely, and a
/// deleted id is never handed out again.
pub(crate) fn generate_entry_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);

    // Set version (4) and variant (RFC 4122).
    bytes[6] = (bytes[6] & 0x0F) | 0x40;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;

    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..],
    )
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
