//! Client-side encryption for vault item payloads.
//!
//! Every call to [`encrypt`] is self-contained:
//!
//! - KDF: PBKDF2-HMAC-SHA256 (100 000 iterations) turns the master password and
//!   a fresh 16-byte salt into a 256-bit key.
//! - AEAD: AES-256-GCM with a fresh 12-byte nonce and no associated data.
//! - Framing: `salt ‖ nonce ‖ ciphertext ‖ tag`, base64 encoded as one string.
//!
//! The derived key is never cached across blobs. Each blob carries its own
//! salt, so decryption needs nothing but the blob and the master password.
//!
//! Things to keep in mind:
//!
//! - Never reuse a `(key, nonce)` pair. Fresh randomness per call makes this
//!   hold without bookkeeping.
//! - Every decryption failure is reported as [`CryptoError::Decryption`].
//!   Callers must not try to tell "wrong password" from "tampered data".
//! - Do not log keys, plaintext, or blob contents. Lengths are fine.

mod blob;
mod cipher;
mod kdf;

use thiserror::Error;

pub use cipher::{decrypt, encrypt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("key derivation failed")]
    KeyDerivation,

    #[error("encryption failed")]
    Encryption,

    #[error("decryption failed: wrong master password or corrupted data")]
    Decryption,
}
