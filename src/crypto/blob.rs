//! Encoded blob framing: `[salt: 16][nonce: 12][ciphertext || tag: 16]`,
//! whole thing base64 (standard alphabet, padded).

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::CryptoError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;
/// Minimum decoded length: salt plus nonce.
pub const HEADER_LEN: usize = SALT_LEN + NONCE_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlob {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// AEAD output with the tag appended.
    pub ciphertext: Vec<u8>,
}

impl SealedBlob {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split decoded bytes into their fields.
    ///
    /// Only the header length is checked here; a ciphertext shorter than the
    /// tag is left for the AEAD to reject so that every failure looks alike.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < HEADER_LEN {
            return Err(CryptoError::Decryption);
        }

        let (salt, rest) = bytes.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        Ok(Self {
            salt: salt.try_into().map_err(|_| CryptoError::Decryption)?,
            nonce: nonce.try_into().map_err(|_| CryptoError::Decryption)?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

impl fmt::Display for SealedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&STANDARD.encode(self.to_bytes()))
    }
}

impl FromStr for SealedBlob {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = STANDARD
            .decode(s.trim())
            .map_err(|_| CryptoError::Decryption)?;
        Self::from_bytes(&bytes)
    }
}
