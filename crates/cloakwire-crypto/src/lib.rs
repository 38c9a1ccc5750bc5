//! Cloakwire Cipher Primitives
//!
//! Cryptographic building blocks for the two channel transforms: the RSA-OAEP
//! bootstrap cipher that moves small fixed-size secrets, and the AES-256-CBC
//! session cipher that carries all post-handshake traffic. Callers provide
//! the RNG so tests can seed it deterministically.
//!
//! # Key Lifecycle
//!
//! ```text
//! RSA keypair (ephemeral, per connection)
//!        │
//!        ▼
//! OAEP-SHA256 → encrypted session key + IV on the wire
//!        │
//!        ▼
//! SessionKey (32-byte key + 16-byte IV, whole connection lifetime)
//!        │
//!        ▼
//! AES-256-CBC + PKCS#7 → all subsequent traffic
//! ```
//!
//! The keypair exists only for the handshake and is dropped once the session
//! key is installed; the session key is never rotated or re-derived within a
//! connection.
//!
//! # Security
//!
//! - OAEP uses SHA-256 for both the digest and the mask generation function.
//! - The session IV is fixed for the connection lifetime. CBC with a static
//!   IV across messages leaks plaintext-prefix equality between messages; the
//!   wire format mandates it, so it is documented here rather than fixed.
//! - Key and IV bytes are zeroized on drop.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod asymmetric;
pub mod error;
pub mod symmetric;

pub use asymmetric::{PeerPublicKey, RSA_KEY_BITS, RsaKeypair};
pub use error::CryptoError;
pub use symmetric::{SESSION_IV_SIZE, SESSION_KEY_SIZE, SessionKey};
