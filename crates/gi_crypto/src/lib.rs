//! Sample encryption-at-rest (spec §3 invariant 5, §6) and the
//! streaming six-algorithm hasher used by `submit/sample` (spec §4.2).
//!
//! On-disk layout: `salt(16) ‖ iv(16) ‖ AES-256-CBC(PKCS7(plaintext))`,
//! keyed by PBKDF2-HMAC-SHA256 over the shared bearer token, 100,000
//! iterations, 32-byte key, salt = the file's own first 16 bytes.

pub mod hashes;

use aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;

pub const SALT_LEN: usize = 16;
pub const IV_LEN: usize = 16;
pub const PBKDF2_ITERATIONS: u32 = 100_000;
pub const KEY_LEN: usize = 32;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("ciphertext shorter than salt+iv header ({0} bytes)")]
    Truncated(usize),
    #[error("PKCS7 unpadding failed: corrupt ciphertext or wrong passphrase")]
    Unpad,
}

/// Derive a 32-byte AES-256 key from `passphrase` and `salt` via
/// PBKDF2-HMAC-SHA256 with the spec's fixed iteration count.
pub fn derive_key(passphrase: &str, salt: &[u8; SALT_LEN]) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(passphrase.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
    key
}

/// Encrypt `plaintext` under `passphrase`, returning
/// `salt ‖ iv ‖ ciphertext` ready to write to disk.
pub fn encrypt(plaintext: &[u8], passphrase: &str) -> Vec<u8> {
    let mut salt = [0u8; SALT_LEN];
    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    rand::thread_rng().fill_bytes(&mut iv);
    encrypt_with_salt_iv(plaintext, passphrase, &salt, &iv)
}

/// Encrypt with an explicit salt/iv, for deterministic tests.
pub fn encrypt_with_salt_iv(
    plaintext: &[u8],
    passphrase: &str,
    salt: &[u8; SALT_LEN],
    iv: &[u8; IV_LEN],
) -> Vec<u8> {
    let key = derive_key(passphrase, salt);
    let ciphertext = Aes256CbcEnc::new(&key.into(), iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut framed = Vec::with_capacity(SALT_LEN + IV_LEN + ciphertext.len());
    framed.extend_from_slice(salt);
    framed.extend_from_slice(iv);
    framed.extend_from_slice(&ciphertext);
    framed
}

/// Decrypt a `salt ‖ iv ‖ ciphertext` blob produced by [`encrypt`].
pub fn decrypt(framed: &[u8], passphrase: &str) -> Result<Vec<u8>, CryptoError> {
    if framed.len() < SALT_LEN + IV_LEN {
        return Err(CryptoError::Truncated(framed.len()));
    }
    let (salt, rest) = framed.split_at(SALT_LEN);
    let (iv, ciphertext) = rest.split_at(IV_LEN);

    let salt: [u8; SALT_LEN] = salt.try_into().expect("split_at guarantees length");
    let key = derive_key(passphrase, &salt);

    Aes256CbcDec::new(&key.into(), iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Unpad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_plaintext() {
        let salt = [7u8; SALT_LEN];
        let iv = [9u8; IV_LEN];
        for len in [0usize, 1, 15, 16, 17, 1000] {
            let plaintext = vec![0xABu8; len];
            let framed = encrypt_with_salt_iv(&plaintext, "shared-token", &salt, &iv);
            assert_eq!(framed.len(), SALT_LEN + IV_LEN + framed.len() - SALT_LEN - IV_LEN);
            let decrypted = decrypt(&framed, "shared-token").unwrap();
            assert_eq!(decrypted, plaintext, "len={len}");
        }
    }

    #[test]
    fn frame_layout_is_salt_then_iv_then_ciphertext() {
        let salt = [1u8; SALT_LEN];
        let iv = [2u8; IV_LEN];
        let framed = encrypt_with_salt_iv(b"hello world", "tok", &salt, &iv);
        assert_eq!(&framed[..SALT_LEN], &salt);
        assert_eq!(&framed[SALT_LEN..SALT_LEN + IV_LEN], &iv);
    }

    #[test]
    fn wrong_passphrase_fails_to_decrypt() {
        let framed = encrypt(b"secret payload", "correct-token");
        let result = decrypt(&framed, "wrong-token");
        assert!(result.is_err());
    }

    #[test]
    fn truncated_blob_is_rejected() {
        let err = decrypt(&[0u8; 10], "tok").unwrap_err();
        assert!(matches!(err, CryptoError::Truncated(10)));
    }
}
