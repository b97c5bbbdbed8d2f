//! PIN authentication gate.
//!
//! A finite state machine governing whether the vault contents are
//! reachable. The host feeds digit and backspace events in; the gate
//! answers with semantic [`AuthEvent`]s that the host renders as
//! user-visible messages. There is no lockout or backoff — every mismatch
//! is independently retryable.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::error::VaultError;
use crate::storage::{Storage, PIN_KEY};

/// Required PIN length in digits.
pub const PIN_LEN: usize = 4;

/// The gate's current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// No PIN exists yet — one must be set.
    Create,
    /// A PIN exists — it must be matched to proceed.
    Login,
    /// Authenticated; the vault is visible. The steady accepting state.
    Home,
    /// Authenticated user is setting a replacement PIN.
    Change,
}

/// Semantic events emitted by the gate for the notification collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// The vault was unlocked (initial PIN set, or a correct login).
    Unlocked,
    /// Confirmation was requested with fewer than [`PIN_LEN`] digits.
    PinTooShort,
    /// The entered PIN did not match the stored one; the buffer was reset.
    PinMismatch,
    /// A replacement PIN was stored and the gate returned home.
    PinChanged,
}

/// Stored PIN record, persisted as JSON under [`PIN_KEY`].
#[derive(Serialize, Deserialize)]
struct PinRecord {
    pin: String,
}

impl Drop for PinRecord {
    fn drop(&mut self) {
        self.pin.zeroize();
    }
}

/// The PIN state machine.
///
/// Runs for the life of the process; there is no terminal state.
#[derive(Debug)]
pub struct AuthGate<S> {
    storage: S,
    stored_pin: Option<String>,
    entered: String,
    mode: AuthMode,
}

impl<S: Storage> AuthGate<S> {
    /// Open the gate, reading any stored PIN to pick the initial mode:
    /// [`AuthMode::Create`] on first run, [`AuthMode::Login`] otherwise.
    ///
    /// # Errors
    ///
    /// - [`VaultError::Decode`] if the stored PIN record is corrupt
    /// - [`VaultError::Persistence`] if the storage read fails
    pub fn open(storage: S) -> Result<Self, VaultError> {
        let stored_pin = match storage.get(PIN_KEY)? {
            None => None,
            Some(bytes) => {
                let mut record: PinRecord = serde_json::from_slice(&bytes)
                    .map_err(|e| VaultError::Decode(format!("stored PIN record: {e}")))?;
                Some(std::mem::take(&mut record.pin))
            }
        };

        let mode = if stored_pin.is_some() {
            AuthMode::Login
        } else {
            AuthMode::Create
        };
        debug!(?mode, "auth gate opened");

        Ok(Self {
            storage,
            stored_pin,
            entered: String::new(),
            mode,
        })
    }

    /// The gate's current mode.
    #[must_use]
    pub const fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Number of digits currently in the entry buffer (0..=[`PIN_LEN`]).
    #[must_use]
    pub fn entered_len(&self) -> usize {
        self.entered.len()
    }

    /// Whether the vault contents are currently visible.
    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        matches!(self.mode, AuthMode::Home)
    }

    /// Whether the user has passed authentication ([`AuthMode::Home`] or
    /// mid-[`AuthMode::Change`]).
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.mode, AuthMode::Home | AuthMode::Change)
    }

    /// Feed one keypad digit into the entry buffer.
    ///
    /// Ignored in [`AuthMode::Home`] and for non-digit characters. When
    /// the buffer reaches exactly [`PIN_LEN`] digits, confirmation fires
    /// automatically — no explicit submit is needed.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Persistence`] if an auto-triggered
    /// confirmation fails to persist a new PIN; the mode is left at its
    /// pre-attempt value.
    pub fn press_digit(&mut self, digit: char) -> Result<Option<AuthEvent>, VaultError> {
        if self.mode == AuthMode::Home || !digit.is_ascii_digit() {
            return Ok(None);
        }

        if self.entered.len() < PIN_LEN {
            self.entered.push(digit);
        }

        if self.entered.len() == PIN_LEN {
            self.confirm().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Remove the last entered digit; no-op when the buffer is empty.
    pub fn backspace(&mut self) {
        self.entered.pop();
    }

    /// Confirm the entry buffer against the current mode's rule.
    ///
    /// With fewer than [`PIN_LEN`] digits this reports
    /// [`AuthEvent::PinTooShort`] without any state change. In
    /// [`AuthMode::Home`] there is nothing to confirm and
    /// [`AuthEvent::Unlocked`] is reported as-is.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Persistence`] if storing a new PIN fails
    /// during `Create`/`Change`. The transition is not committed: the mode
    /// stays at its pre-attempt value (the buffer is still cleared).
    pub fn confirm(&mut self) -> Result<AuthEvent, VaultError> {
        match self.mode {
            AuthMode::Home => Ok(AuthEvent::Unlocked),
            _ if self.entered.len() < PIN_LEN => Ok(AuthEvent::PinTooShort),
            AuthMode::Create | AuthMode::Change => {
                let changing = self.mode == AuthMode::Change;
                let mut candidate = std::mem::take(&mut self.entered);

                // Durably persist before declaring the transition committed.
                if let Err(err) = self.persist_pin(&candidate) {
                    warn!(mode = ?self.mode, "PIN persist failed; transition rolled back");
                    candidate.zeroize();
                    return Err(err);
                }

                if let Some(mut old) = self.stored_pin.replace(candidate) {
                    old.zeroize();
                }
                self.mode = AuthMode::Home;
                debug!(changing, "PIN stored, gate unlocked");

                Ok(if changing {
                    AuthEvent::PinChanged
                } else {
                    AuthEvent::Unlocked
                })
            }
            AuthMode::Login => {
                let matched = self.stored_pin.as_deref() == Some(self.entered.as_str());
                self.entered.zeroize();

                if matched {
                    self.mode = AuthMode::Home;
                    debug!("login succeeded");
                    Ok(AuthEvent::Unlocked)
                } else {
                    debug!("login PIN mismatch");
                    Ok(AuthEvent::PinMismatch)
                }
            }
        }
    }

    /// Begin a PIN change. Only valid from [`AuthMode::Home`]; a no-op
    /// anywhere else.
    pub fn request_change(&mut self) {
        if self.mode == AuthMode::Home {
            self.mode = AuthMode::Change;
            self.entered.zeroize();
        }
    }

    /// Abandon a PIN change: discard the buffer and return to
    /// [`AuthMode::Home`] with the stored PIN untouched. A no-op outside
    /// [`AuthMode::Change`].
    pub fn cancel_change(&mut self) {
        if self.mode == AuthMode::Change {
            self.mode = AuthMode::Home;
            self.entered.zeroize();
        }
    }

    fn persist_pin(&mut self, pin: &str) -> Result<(), VaultError> {
        let record = PinRecord {
            pin: pin.to_owned(),
        };
        let bytes = serde_json::to_vec(&record)
            .map_err(|e| VaultError::Decode(format!("failed to encode PIN record: {e}")))?;
        self.storage.set(PIN_KEY, &bytes)?;
        Ok(())
    }
}

/// Wipe PIN material when the gate goes out of scope.
impl<S> Drop for AuthGate<S> {
    fn drop(&mut self) {
        self.entered.zeroize();
        if let Some(ref mut pin) = self.stored_pin {
            pin.zeroize();
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
