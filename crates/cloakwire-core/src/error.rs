//! Error types for the channel core.
//!
//! Strongly-typed errors for the two security boundaries: handshake sequence
//! violations and post-handshake transform failures. Transport failures are
//! carried as strings rather than `std::io::Error` so the type stays
//! cloneable and comparable in tests; conversion happens at the boundary.

use std::io;

use cloakwire_crypto::CryptoError;
use cloakwire_proto::ProtocolError;
use thiserror::Error;

use crate::handshake::HandshakePhase;

/// Errors surfaced by channels and the handshake orchestrator.
///
/// Every variant is fatal to the connection attempt it occurs on. None are
/// retried internally: retrying a failed security handshake without fresh key
/// material would reuse compromised state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Envelope failed to parse, or carried an unknown discriminant.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Received something other than what the current handshake step expects,
    /// or key material of the wrong length. The raw connection is closed
    /// before this is surfaced.
    #[error("handshake violation during {phase:?}: {detail}")]
    HandshakeViolation {
        /// Handshake phase in which the violation occurred.
        phase: HandshakePhase,
        /// What was violated.
        detail: String,
    },

    /// Cryptographic transform failure: malformed ciphertext, padding
    /// validation failure, or a decryption exception.
    #[error("channel security failure: {reason}")]
    Security {
        /// Underlying failure description.
        reason: String,
    },

    /// Underlying transport error.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Transform failures map onto the security boundary by default; the
/// handshake remaps key-material errors to sequence violations where they
/// occur inside a handshake step.
impl From<CryptoError> for ChannelError {
    fn from(err: CryptoError) -> Self {
        Self::Security { reason: err.to_string() }
    }
}

impl From<io::Error> for ChannelError {
    fn from(err: io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
