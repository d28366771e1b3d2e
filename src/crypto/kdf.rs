use std::fmt;

use hmac::Hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::CryptoError;
use super::blob::SALT_LEN;
use crate::session::MasterPassword;

/// Size (bytes) of the AES-256-GCM key.
pub const KEY_LEN: usize = 32;
/// PBKDF2 iteration count used for every stored blob.
///
/// The count is not part of the blob framing, so changing it breaks every
/// previously sealed item.
pub const KDF_ITERATIONS: u32 = 100_000;

/// PBKDF2 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    pub iterations: u32,
}

impl KdfParams {
    pub fn recommended() -> Self {
        Self {
            iterations: KDF_ITERATIONS,
        }
    }

    /// Cheap parameters for unit tests. Blobs sealed with these do not open
    /// under [`KdfParams::recommended`].
    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self { iterations: 1_000 }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::recommended()
    }
}

/// A derived AES key. Zeroized on drop and never handed out as bytes outside
/// the crypto module.
pub struct DerivedKey(Zeroizing<[u8; KEY_LEN]>);

impl DerivedKey {
    pub(super) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Derive the per-blob key from the master password and the blob's salt.
///
/// Deterministic in `(master_password, salt, params)`.
pub(super) fn derive_key(
    master_password: &MasterPassword,
    salt: &[u8; SALT_LEN],
    params: KdfParams,
) -> Result<DerivedKey, CryptoError> {
    if params.iterations == 0 {
        return Err(CryptoError::KeyDerivation);
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(
        master_password.expose_bytes(),
        salt,
        params.iterations,
        key.as_mut_slice(),
    )
    .map_err(|_| CryptoError::KeyDerivation)?;

    Ok(DerivedKey(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn password(value: &str) -> MasterPassword {
        MasterPassword::new(value.to_string())
    }

    #[test]
    fn same_password_and_salt_yield_same_key() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key(&password("hunter2"), &salt, KdfParams::for_tests()).unwrap();
        let b = derive_key(&password("hunter2"), &salt, KdfParams::for_tests()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salt_yields_different_key() {
        let pw = password("hunter2");
        let a = derive_key(&pw, &[1u8; SALT_LEN], KdfParams::for_tests()).unwrap();
        let b = derive_key(&pw, &[2u8; SALT_LEN], KdfParams::for_tests()).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_password_yields_different_key() {
        let salt = [3u8; SALT_LEN];
        let a = derive_key(&password("one"), &salt, KdfParams::for_tests()).unwrap();
        let b = derive_key(&password("two"), &salt, KdfParams::for_tests()).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn matches_known_pbkdf2_sha256_output() {
        let key = derive_key(&password("hunter2"), &[7u8; SALT_LEN], KdfParams::for_tests()).unwrap();
        let expected: [u8; KEY_LEN] = [
            0xa5, 0x75, 0xac, 0xa6, 0x00, 0x37, 0x7d, 0x7b, 0x07, 0x01, 0x0d, 0x15, 0x1a, 0x24,
            0xfb, 0xf6, 0x25, 0xcb, 0xba, 0xa5, 0x37, 0xc8, 0xc4, 0x8f, 0xd4, 0xba, 0x2e, 0x1b,
            0x0a, 0x80, 0x00, 0xa8,
        ];
        assert_eq!(key.as_bytes(), &expected);
    }

    #[test]
    fn zero_iterations_is_rejected() {
        let err = derive_key(&password("pw"), &[0u8; SALT_LEN], KdfParams { iterations: 0 })
            .unwrap_err();
        assert_eq!(err, CryptoError::KeyDerivation);
    }

    #[test]
    fn debug_output_is_redacted() {
        let key = derive_key(&password("pw"), &[0u8; SALT_LEN], KdfParams::for_tests()).unwrap();
        assert_eq!(format!("{key:?}"), "DerivedKey([REDACTED])");
    }
}
