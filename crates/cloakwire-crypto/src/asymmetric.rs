//! RSA-OAEP bootstrap cipher.
//!
//! Used exclusively during the handshake to move small fixed-size secrets:
//! first the public key parameters travel in the clear, then the symmetric
//! session key and IV travel under OAEP. Asymmetric encryption has a strict
//! plaintext bound derived from the key size, so this layer is never used for
//! application payloads.
//!
//! Public key parameters cross the wire as decimal strings. `BigUint` formats
//! and parses base-10 without precision loss at any width, which is the whole
//! point of the encoding.

use rand::{CryptoRng, RngCore};
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey, traits::PublicKeyParts};
use sha2::Sha256;

use crate::error::CryptoError;

/// RSA key size used on the wire, in bits.
pub const RSA_KEY_BITS: usize = 4096;

/// OAEP overhead for SHA-256: two digests plus two separator bytes.
const OAEP_OVERHEAD: usize = 2 * 32 + 2;

/// Ephemeral per-connection RSA keypair.
///
/// Generated locally at the start of a handshake and dropped as soon as the
/// symmetric session is installed. Only the public half's exponent and
/// modulus ever leave the process.
#[derive(Debug, Clone)]
pub struct RsaKeypair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeypair {
    /// Generate a fresh keypair at the wire key size ([`RSA_KEY_BITS`]).
    ///
    /// # Errors
    ///
    /// - [`CryptoError::KeyGeneration`] if prime generation fails
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Result<Self, CryptoError> {
        Self::generate_with_size(rng, RSA_KEY_BITS)
    }

    /// Generate a keypair at an explicit key size.
    ///
    /// Production code goes through [`RsaKeypair::generate`]; smaller sizes
    /// exist so handshake tests don't pay for 4096-bit prime generation.
    pub fn generate_with_size<R: CryptoRng + RngCore>(
        rng: &mut R,
        bits: usize,
    ) -> Result<Self, CryptoError> {
        let private = RsaPrivateKey::new(rng, bits)
            .map_err(|e| CryptoError::KeyGeneration { reason: e.to_string() })?;
        let public = private.to_public_key();
        Ok(Self { private, public })
    }

    /// Public exponent and modulus as decimal strings, in that order.
    #[must_use]
    pub fn public_numbers(&self) -> (String, String) {
        (self.public.e().to_string(), self.public.n().to_string())
    }

    /// Decrypt an inbound OAEP-SHA256 ciphertext with the private half.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::DecryptFailed`] on malformed ciphertext or OAEP
    ///   validation failure
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.private
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CryptoError::DecryptFailed { reason: e.to_string() })
    }
}

/// Public key reconstructed from a peer's `ENCRYPT` envelope.
///
/// Read-only; used only to encrypt outbound key material during the
/// bootstrap phase.
#[derive(Debug, Clone)]
pub struct PeerPublicKey {
    key: RsaPublicKey,
}

impl PeerPublicKey {
    /// Reconstruct a public key from decimal-string exponent and modulus.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidKeyMaterial`] if either string is not a
    ///   decimal integer or the pair does not form a usable RSA key
    pub fn from_decimal(exponent: &str, modulus: &str) -> Result<Self, CryptoError> {
        let e = parse_decimal(exponent, "exponent")?;
        let n = parse_decimal(modulus, "modulus")?;

        let key = RsaPublicKey::new(n, e)
            .map_err(|e| CryptoError::InvalidKeyMaterial { reason: e.to_string() })?;

        Ok(Self { key })
    }

    /// Largest plaintext this key can encrypt under OAEP-SHA256.
    #[must_use]
    pub fn max_plaintext_len(&self) -> usize {
        self.key.size().saturating_sub(OAEP_OVERHEAD)
    }

    /// Encrypt a small secret for the peer under OAEP-SHA256.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::EncryptFailed`] if `plaintext` exceeds
    ///   [`PeerPublicKey::max_plaintext_len`]
    pub fn encrypt<R: CryptoRng + RngCore>(
        &self,
        rng: &mut R,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        self.key
            .encrypt(rng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|e| CryptoError::EncryptFailed { reason: e.to_string() })
    }
}

fn parse_decimal(text: &str, field: &str) -> Result<BigUint, CryptoError> {
    BigUint::parse_bytes(text.as_bytes(), 10).ok_or_else(|| CryptoError::InvalidKeyMaterial {
        reason: format!("{field} is not a decimal integer: {text:?}"),
    })
}
