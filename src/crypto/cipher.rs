use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;
use tracing::{debug, trace};
use zeroize::{Zeroize, Zeroizing};

use super::CryptoError;
use super::blob::{HEADER_LEN, NONCE_LEN, SALT_LEN, SealedBlob, TAG_LEN};
use super::kdf::{KdfParams, derive_key};
use crate::session::MasterPassword;

/// Encrypt `plaintext` under `master_password` into a self-contained encoded blob.
///
/// A fresh salt and nonce are drawn on every call, so encrypting the same
/// input twice yields two different blobs.
pub fn encrypt(plaintext: &str, master_password: &MasterPassword) -> Result<String, CryptoError> {
    encrypt_with_params(plaintext, master_password, KdfParams::recommended())
}

/// Decrypt an encoded blob produced by [`encrypt`].
///
/// Malformed framing, bad base64, a failed tag check and non-UTF-8 plaintext
/// all surface as [`CryptoError::Decryption`].
pub fn decrypt(
    encoded: &str,
    master_password: &MasterPassword,
) -> Result<Zeroizing<String>, CryptoError> {
    decrypt_with_params(encoded, master_password, KdfParams::recommended())
}

pub(super) fn encrypt_with_params(
    plaintext: &str,
    master_password: &MasterPassword,
    params: KdfParams,
) -> Result<String, CryptoError> {
    let salt = try_random_bytes::<SALT_LEN>().map_err(|_| CryptoError::Encryption)?;
    let nonce = try_random_bytes::<NONCE_LEN>().map_err(|_| CryptoError::Encryption)?;

    let blob = seal(plaintext.as_bytes(), master_password, salt, nonce, params)?;
    Ok(blob.to_string())
}

pub(super) fn decrypt_with_params(
    encoded: &str,
    master_password: &MasterPassword,
    params: KdfParams,
) -> Result<Zeroizing<String>, CryptoError> {
    let blob: SealedBlob = encoded.parse().inspect_err(|_| {
        debug!(encoded_len = encoded.len(), "rejected blob");
    })?;
    open(&blob, master_password, params)
}

fn seal(
    plaintext: &[u8],
    master_password: &MasterPassword,
    salt: [u8; SALT_LEN],
    nonce: [u8; NONCE_LEN],
    params: KdfParams,
) -> Result<SealedBlob, CryptoError> {
    let key = derive_key(master_password, &salt, params)?;
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::Encryption)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption)?;
    debug_assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

    trace!(
        plaintext_len = plaintext.len(),
        blob_len = HEADER_LEN + ciphertext.len(),
        "sealed blob"
    );

    Ok(SealedBlob {
        salt,
        nonce,
        ciphertext,
    })
}

fn open(
    blob: &SealedBlob,
    master_password: &MasterPassword,
    params: KdfParams,
) -> Result<Zeroizing<String>, CryptoError> {
    let key = derive_key(master_password, &blob.salt, params)?;
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::Decryption)?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&blob.nonce), blob.ciphertext.as_slice())
        .map_err(|_| {
            debug!("rejected blob");
            CryptoError::Decryption
        })?;

    match String::from_utf8(plaintext) {
        Ok(text) => Ok(Zeroizing::new(text)),
        Err(err) => {
            let mut bytes = err.into_bytes();
            bytes.zeroize();
            debug!("rejected blob");
            Err(CryptoError::Decryption)
        }
    }
}

fn try_random_bytes<const N: usize>() -> Result<[u8; N], rand::Error> {
    let mut bytes = [0u8; N];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    const ITEM_JSON: &str =
        r#"{"title":"Gmail","username":"a@b.com","password":"xyz","url":"","notes":""}"#;
    const STAPLE: &str = "correct horse battery staple";

    // Sealed with salt 00..0f and nonce 64..6f under the recommended parameters.
    const ITEM_JSON_FIXTURE: &str = "AAECAwQFBgcICQoLDA0OD2RlZmdoaWprbG1ub5Gf5eHAg67tw4qK9/76pgECuaZmd1AuZOoeCakvPKeOvmAmGZMxOpP/3H+JEItldPoqXX+cYcNjYqXXVAuAEGClQguFJXd2/MtLd9u67Kv//zgxv2boKZJLF40=";

    fn pw(value: &str) -> MasterPassword {
        MasterPassword::new(value.to_string())
    }

    fn fast_encrypt(plaintext: &str, master_password: &MasterPassword) -> String {
        encrypt_with_params(plaintext, master_password, KdfParams::for_tests()).unwrap()
    }

    fn fast_decrypt(
        encoded: &str,
        master_password: &MasterPassword,
    ) -> Result<Zeroizing<String>, CryptoError> {
        decrypt_with_params(encoded, master_password, KdfParams::for_tests())
    }

    #[test]
    fn roundtrip_restores_plaintext() {
        let master = pw(STAPLE);
        let large = "x".repeat(64 * 1024);
        for plaintext in ["", "a", ITEM_JSON, "ünïcødé 🔐 text", large.as_str()] {
            let blob = fast_encrypt(plaintext, &master);
            assert_eq!(fast_decrypt(&blob, &master).unwrap().as_str(), plaintext);
        }
    }

    #[test]
    fn default_parameters_roundtrip() {
        let master = pw(STAPLE);
        let blob = encrypt(ITEM_JSON, &master).unwrap();
        assert_eq!(decrypt(&blob, &master).unwrap().as_str(), ITEM_JSON);
    }

    #[test]
    fn opens_blob_sealed_elsewhere() {
        let plaintext = decrypt(ITEM_JSON_FIXTURE, &pw(STAPLE)).unwrap();
        assert_eq!(plaintext.as_str(), ITEM_JSON);
    }

    #[test]
    fn fixed_salt_and_nonce_reproduce_fixture() {
        let salt: [u8; SALT_LEN] = std::array::from_fn(|i| i as u8);
        let nonce: [u8; NONCE_LEN] = std::array::from_fn(|i| 100 + i as u8);
        let blob = seal(
            ITEM_JSON.as_bytes(),
            &pw(STAPLE),
            salt,
            nonce,
            KdfParams::recommended(),
        )
        .unwrap();
        assert_eq!(blob.to_string(), ITEM_JSON_FIXTURE);
    }

    #[test]
    fn blob_length_is_plaintext_plus_framing() {
        let blob = fast_encrypt(ITEM_JSON, &pw(STAPLE));
        let decoded = STANDARD.decode(&blob).unwrap();
        assert_eq!(decoded.len(), ITEM_JSON.len() + HEADER_LEN + TAG_LEN);
    }

    #[test]
    fn encrypting_twice_gives_distinct_blobs() {
        let master = pw(STAPLE);
        let first = fast_encrypt(ITEM_JSON, &master);
        let second = fast_encrypt(ITEM_JSON, &master);
        assert_ne!(first, second);

        let first: SealedBlob = first.parse().unwrap();
        let second: SealedBlob = second.parse().unwrap();
        assert_ne!(first.salt, second.salt);
        assert_ne!(first.nonce, second.nonce);
    }

    #[test]
    fn decrypting_twice_gives_same_plaintext() {
        let master = pw(STAPLE);
        let blob = fast_encrypt(ITEM_JSON, &master);
        let once = fast_decrypt(&blob, &master).unwrap();
        let twice = fast_decrypt(&blob, &master).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn wrong_password_is_rejected() {
        let blob = fast_encrypt(ITEM_JSON, &pw(STAPLE));
        let err = fast_decrypt(&blob, &pw("Correct horse battery staple")).unwrap_err();
        assert_eq!(err, CryptoError::Decryption);
    }

    #[test]
    fn any_flipped_ciphertext_or_tag_byte_is_rejected() {
        let master = pw(STAPLE);
        let blob = fast_encrypt("short secret", &master);
        let bytes = STANDARD.decode(&blob).unwrap();

        for index in HEADER_LEN..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[index] ^= 0x01;
            let err = fast_decrypt(&STANDARD.encode(&tampered), &master).unwrap_err();
            assert_eq!(err, CryptoError::Decryption, "byte {index} not detected");
        }
    }

    #[test]
    fn flipped_salt_or_nonce_is_rejected() {
        let master = pw(STAPLE);
        let bytes = STANDARD.decode(fast_encrypt("short secret", &master)).unwrap();

        for index in [0, SALT_LEN - 1, SALT_LEN, HEADER_LEN - 1] {
            let mut tampered = bytes.clone();
            tampered[index] ^= 0x80;
            let err = fast_decrypt(&STANDARD.encode(&tampered), &master).unwrap_err();
            assert_eq!(err, CryptoError::Decryption);
        }
    }

    #[test]
    fn truncated_blobs_are_rejected() {
        let master = pw(STAPLE);
        let bytes = STANDARD.decode(fast_encrypt("short secret", &master)).unwrap();

        for len in [0, 1, HEADER_LEN - 1, HEADER_LEN, HEADER_LEN + TAG_LEN - 1, bytes.len() - 1] {
            let err = fast_decrypt(&STANDARD.encode(&bytes[..len]), &master).unwrap_err();
            assert_eq!(err, CryptoError::Decryption, "length {len} accepted");
        }
    }

    #[test]
    fn every_failure_reads_the_same() {
        let master = pw(STAPLE);
        let blob = fast_encrypt(ITEM_JSON, &master);

        let wrong_password = fast_decrypt(&blob, &pw("nope")).unwrap_err();
        let garbage = fast_decrypt("%%%", &master).unwrap_err();
        let truncated = fast_decrypt("AAAA", &master).unwrap_err();

        assert_eq!(wrong_password.to_string(), garbage.to_string());
        assert_eq!(garbage.to_string(), truncated.to_string());
    }

    #[test]
    fn non_utf8_plaintext_is_rejected() {
        let master = pw(STAPLE);
        let blob = seal(
            &[0xf0, 0x28, 0x8c, 0x28],
            &master,
            [1u8; SALT_LEN],
            [2u8; NONCE_LEN],
            KdfParams::for_tests(),
        )
        .unwrap();
        let err = fast_decrypt(&blob.to_string(), &master).unwrap_err();
        assert_eq!(err, CryptoError::Decryption);
    }
}
