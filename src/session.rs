//! Master password ownership.
//!
//! The master password lives only inside a [`Session`]. Locking the session
//! (or dropping it) drops the [`MasterPassword`], whose backing memory is
//! zeroized. Nothing in this module writes the secret anywhere.

use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;
use thiserror::Error;
use tracing::debug;

/// Session-scoped environment variable consulted only when the user opted in
/// to remembering the master password.
pub const MASTER_PASSWORD_ENV: &str = "KEYNEST_MASTER_PASSWORD";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("vault is locked; unlock it with the master password first")]
    Locked,

    #[error("master password cannot be empty")]
    EmptyPassword,
}

/// The user's master password. Debug output is redacted and the memory is
/// zeroized on drop.
#[derive(Debug)]
pub struct MasterPassword(SecretString);

impl MasterPassword {
    /// Copies `value` into an exact-size secret buffer, then wipes `value`
    /// including its spare capacity.
    pub fn new(mut value: String) -> Self {
        let secret = SecretString::new(Box::from(value.as_str()));
        value.zeroize();
        Self(secret)
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }

    /// UTF-8 bytes fed to the key derivation function.
    pub(crate) fn expose_bytes(&self) -> &[u8] {
        self.0.expose_secret().as_bytes()
    }
}

/// Explicitly owned unlock state.
#[derive(Debug, Default)]
pub struct Session {
    master_password: Option<MasterPassword>,
}

impl Session {
    pub fn locked() -> Self {
        Self::default()
    }

    pub fn unlock(&mut self, master_password: MasterPassword) -> Result<(), SessionError> {
        if master_password.is_empty() {
            return Err(SessionError::EmptyPassword);
        }
        self.master_password = Some(master_password);
        debug!("session unlocked");
        Ok(())
    }

    /// Drop the master password. Safe to call on an already locked session.
    pub fn lock(&mut self) {
        if self.is_unlocked() {
            self.master_password = None;
            debug!("session locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.master_password.is_some()
    }

    pub fn master_password(&self) -> Result<&MasterPassword, SessionError> {
        self.master_password.as_ref().ok_or(SessionError::Locked)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.lock();
    }
}

/// Read a remembered master password from the session environment.
///
/// Returns `None` without touching the environment unless `remember` is set.
pub fn remembered_master_password(remember: bool) -> Option<MasterPassword> {
    if !remember {
        return None;
    }

    let value = std::env::var(MASTER_PASSWORD_ENV).ok()?;
    if value.is_empty() {
        return None;
    }
    debug!("using remembered master password from session environment");
    Some(MasterPassword::new(value))
}
