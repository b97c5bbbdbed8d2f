//! Thin controller composing the auth gate and the credential store.
//!
//! Presentation code talks to the session, never to the snapshot: the
//! store is instantiated on the first transition through the gate and
//! handed out only while the user is authenticated.

use crate::auth::{AuthEvent, AuthGate, AuthMode};
use crate::error::VaultError;
use crate::storage::Storage;
use crate::store::VaultStore;

/// One authenticated vault session.
///
/// `S` must share underlying state across clones ([`crate::FileStorage`]
/// clones share a directory, [`crate::MemoryStorage`] clones share a map)
/// so the gate and the store see the same persisted bytes.
pub struct VaultSession<S> {
    gate: AuthGate<S>,
    store: Option<VaultStore<S>>,
    storage: S,
}

impl<S: Storage + Clone> VaultSession<S> {
    /// Open a session over the host-supplied storage.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Decode`] if the stored PIN record is corrupt
    /// - [`VaultError::Persistence`] if the storage read fails
    pub fn open(storage: S) -> Result<Self, VaultError> {
        let gate = AuthGate::open(storage.clone())?;
        Ok(Self {
            gate,
            store: None,
            storage,
        })
    }

    /// The gate's current mode, for the host to pick a screen.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.gate.mode()
    }

    /// Digits currently in the PIN entry buffer.
    #[must_use]
    pub fn entered_len(&self) -> usize {
        self.gate.entered_len()
    }

    /// Feed a keypad digit through the gate, loading the store on the
    /// first successful unlock.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Persistence`] if persisting a new PIN fails
    /// - [`VaultError::Decode`] if the entry snapshot is corrupt when the
    ///   store is first loaded
    pub fn press_digit(&mut self, digit: char) -> Result<Option<AuthEvent>, VaultError> {
        let event = self.gate.press_digit(digit)?;
        self.ensure_store_loaded()?;
        Ok(event)
    }

    /// Remove the last entered digit.
    pub fn backspace(&mut self) {
        self.gate.backspace();
    }

    /// Explicitly confirm the PIN buffer (hosts with a submit button).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::press_digit`].
    pub fn confirm(&mut self) -> Result<AuthEvent, VaultError> {
        let event = self.gate.confirm()?;
        self.ensure_store_loaded()?;
        Ok(event)
    }

    /// Begin a PIN change (valid from `Home` only).
    pub fn request_pin_change(&mut self) {
        self.gate.request_change();
    }

    /// Abandon an in-progress PIN change.
    pub fn cancel_pin_change(&mut self) {
        self.gate.cancel_change();
    }

    /// Access the credential store, or `None` while locked.
    ///
    /// The store stays reachable during a PIN change — the user already
    /// authenticated to get there.
    pub fn store(&mut self) -> Option<&mut VaultStore<S>> {
        if self.gate.is_authenticated() {
            self.store.as_mut()
        } else {
            None
        }
    }

    fn ensure_store_loaded(&mut self) -> Result<(), VaultError> {
        if self.gate.is_authenticated() && self.store.is_none() {
            self.store = Some(VaultStore::load(self.storage.clone())?);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn enter(session: &mut VaultSession<MemoryStorage>, pin: &str) {
        for digit in pin.chars() {
            session.press_digit(digit).expect("press digit");
        }
    }

    #[test]
    fn store_is_unreachable_while_locked() {
        let mut session = VaultSession::open(MemoryStorage::new()).unwrap();
        assert!(session.store().is_none());
    }

    #[test]
    fn store_becomes_reachable_after_unlock() {
        let mut session = VaultSession::open(MemoryStorage::new()).unwrap();
        enter(&mut session, "1234");

        let store = session.store().expect("unlocked store");
        store.create("GitHub", "hunter2").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_stays_reachable_during_pin_change() {
        let mut session = VaultSession::open(MemoryStorage::new()).unwrap();
        enter(&mut session, "1234");

        session.request_pin_change();
        assert_eq!(session.mode(), AuthMode::Change);
        assert!(session.store().is_some());
    }

    #[test]
    fn session_sees_entries_persisted_by_an_earlier_one() {
        let storage = MemoryStorage::new();

        let mut first = VaultSession::open(storage.clone()).unwrap();
        enter(&mut first, "1234");
        first.store().unwrap().create("GitHub", "x").unwrap();
        drop(first);

        let mut second = VaultSession::open(storage).unwrap();
        assert_eq!(second.mode(), AuthMode::Login);
        enter(&mut second, "1234");
        assert_eq!(second.store().unwrap().len(), 1);
    }
}
