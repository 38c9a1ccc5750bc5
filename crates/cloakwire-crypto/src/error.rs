//! Error types for cipher operations.

use thiserror::Error;

/// Errors produced by the cipher primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Keypair generation failed.
    #[error("key generation failed: {reason}")]
    KeyGeneration {
        /// Underlying failure description.
        reason: String,
    },

    /// Received public key parameters could not be reconstructed into a key.
    #[error("invalid key material: {reason}")]
    InvalidKeyMaterial {
        /// What was wrong with the material.
        reason: String,
    },

    /// Raw key material has the wrong length.
    #[error("{kind} length mismatch: expected {expected} bytes, got {actual}")]
    KeyLength {
        /// Which piece of material was mis-sized.
        kind: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Received length in bytes.
        actual: usize,
    },

    /// Encryption failed (e.g. plaintext exceeds the OAEP bound).
    #[error("encryption failed: {reason}")]
    EncryptFailed {
        /// Underlying failure description.
        reason: String,
    },

    /// Decryption or padding validation failed.
    #[error("decryption failed: {reason}")]
    DecryptFailed {
        /// Underlying failure description.
        reason: String,
    },
}
