//! AES-256-CBC session cipher.
//!
//! Carries all post-handshake traffic. One [`SessionKey`] (key + IV) lives
//! for the whole connection; the IV is static across messages by wire-format
//! mandate (see the crate docs for the trade-off).

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Session key length in bytes (AES-256).
pub const SESSION_KEY_SIZE: usize = 32;

/// Initialization vector length in bytes (AES block size).
///
/// This constant is in bytes everywhere: generation, validation, and the wire
/// both use 16-byte IVs.
pub const SESSION_IV_SIZE: usize = 16;

/// CBC block size in bytes; PKCS#7 pads to this boundary.
const BLOCK_SIZE: usize = 16;

/// Symmetric session secret: AES-256 key plus CBC initialization vector.
///
/// Generated by one party (the server in the observed flow), transmitted to
/// the other exclusively under the asymmetric bootstrap layer, and used
/// unchanged for the connection's entire post-handshake lifetime.
#[derive(Clone)]
pub struct SessionKey {
    key: [u8; SESSION_KEY_SIZE],
    iv: [u8; SESSION_IV_SIZE],
}

// Zeroize key material when the session ends
impl Drop for SessionKey {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    // Never print key material
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey").finish_non_exhaustive()
    }
}

impl SessionKey {
    /// Generate a fresh random session key and IV.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut key = [0u8; SESSION_KEY_SIZE];
        let mut iv = [0u8; SESSION_IV_SIZE];
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut iv);
        Self { key, iv }
    }

    /// Build a session key from raw received material, validating lengths.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::KeyLength`] if `key` is not exactly
    ///   [`SESSION_KEY_SIZE`] bytes or `iv` is not exactly
    ///   [`SESSION_IV_SIZE`] bytes
    pub fn from_parts(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let key: [u8; SESSION_KEY_SIZE] =
            key.try_into().map_err(|_| CryptoError::KeyLength {
                kind: "session key",
                expected: SESSION_KEY_SIZE,
                actual: key.len(),
            })?;
        let iv: [u8; SESSION_IV_SIZE] = iv.try_into().map_err(|_| CryptoError::KeyLength {
            kind: "initialization vector",
            expected: SESSION_IV_SIZE,
            actual: iv.len(),
        })?;
        Ok(Self { key, iv })
    }

    /// Raw key bytes, for transmission under the bootstrap layer.
    #[must_use]
    pub fn key(&self) -> &[u8; SESSION_KEY_SIZE] {
        &self.key
    }

    /// Raw IV bytes, for transmission under the bootstrap layer.
    #[must_use]
    pub fn iv(&self) -> &[u8; SESSION_IV_SIZE] {
        &self.iv
    }

    /// Encrypt a payload of any length.
    ///
    /// PKCS#7 pads to the 128-bit block boundary, so the ciphertext is always
    /// a positive multiple of 16 bytes, strictly longer than the plaintext.
    #[must_use]
    pub fn encrypt(&self, plaintext: &[u8]) -> Vec<u8> {
        Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
    }

    /// Decrypt a ciphertext and strip the padding.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::DecryptFailed`] if the ciphertext is empty, not
    ///   block-aligned, or fails padding validation
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::DecryptFailed {
                reason: format!(
                    "ciphertext length {} is not a positive multiple of {BLOCK_SIZE}",
                    ciphertext.len()
                ),
            });
        }

        Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::DecryptFailed {
                reason: "padding validation failed".to_owned(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::thread_rng;

    use super::*;

    fn test_key(seed: u8) -> SessionKey {
        SessionKey::from_parts(&[seed; SESSION_KEY_SIZE], &[seed.wrapping_add(1); SESSION_IV_SIZE])
            .unwrap()
    }

    #[test]
    fn roundtrip_empty() {
        let session = test_key(1);
        let ciphertext = session.encrypt(b"");
        // Empty plaintext still produces one full padding block
        assert_eq!(ciphertext.len(), BLOCK_SIZE);
        assert_eq!(session.decrypt(&ciphertext).unwrap(), b"");
    }

    #[test]
    fn roundtrip_block_aligned() {
        let session = test_key(2);
        let plaintext = vec![0xABu8; 64];
        let ciphertext = session.encrypt(&plaintext);
        // Aligned input gains a whole extra padding block
        assert_eq!(ciphertext.len(), 80);
        assert_eq!(session.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn roundtrip_unaligned() {
        let session = test_key(3);
        let plaintext = b"seventeen bytes!!";
        let ciphertext = session.encrypt(plaintext);
        assert_eq!(ciphertext.len(), 32);
        assert_eq!(session.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn roundtrip_large() {
        let session = test_key(4);
        let plaintext = vec![0x5Au8; 64 * 1024 + 5];
        let ciphertext = session.encrypt(&plaintext);
        assert_eq!(session.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn unaligned_ciphertext_rejected() {
        let session = test_key(5);
        let mut ciphertext = session.encrypt(b"payload");
        ciphertext.pop();
        assert!(matches!(
            session.decrypt(&ciphertext),
            Err(CryptoError::DecryptFailed { .. })
        ));
    }

    #[test]
    fn empty_ciphertext_rejected() {
        let session = test_key(6);
        assert!(matches!(session.decrypt(b""), Err(CryptoError::DecryptFailed { .. })));
    }

    #[test]
    fn wrong_key_never_recovers_plaintext() {
        let session = test_key(7);
        let other = test_key(8);
        let plaintext = b"confidential payload";

        let ciphertext = session.encrypt(plaintext);

        // Padding may validate by chance, but the plaintext never survives a
        // wrong key.
        match other.decrypt(&ciphertext) {
            Err(CryptoError::DecryptFailed { .. }) => {},
            Err(other_err) => unreachable!("unexpected error: {other_err}"),
            Ok(recovered) => assert_ne!(recovered, plaintext),
        }
    }

    #[test]
    fn tampered_ciphertext_never_recovers_plaintext() {
        let session = test_key(9);
        let plaintext = b"original message body";

        let mut ciphertext = session.encrypt(plaintext);
        ciphertext[0] ^= 0xFF;

        match session.decrypt(&ciphertext) {
            Err(CryptoError::DecryptFailed { .. }) => {},
            Err(other_err) => unreachable!("unexpected error: {other_err}"),
            Ok(recovered) => assert_ne!(recovered, plaintext),
        }
    }

    #[test]
    fn from_parts_validates_lengths() {
        let err = SessionKey::from_parts(&[0u8; 31], &[0u8; 16]).unwrap_err();
        assert_eq!(
            err,
            CryptoError::KeyLength { kind: "session key", expected: 32, actual: 31 }
        );

        let err = SessionKey::from_parts(&[0u8; 32], &[0u8; 2]).unwrap_err();
        assert_eq!(
            err,
            CryptoError::KeyLength { kind: "initialization vector", expected: 16, actual: 2 }
        );
    }

    #[test]
    fn generated_keys_differ() {
        let a = SessionKey::generate(&mut thread_rng());
        let b = SessionKey::generate(&mut thread_rng());
        assert_ne!(a.key(), b.key());
    }
}
