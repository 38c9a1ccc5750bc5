//! Handshake orchestrator.
//!
//! Drives the fixed escalation sequence that takes a raw connection from
//! plaintext to a symmetric-secured channel. The sequence is not negotiable:
//! RSA bootstrap, then AES session, in that order, or the connection dies.
//!
//! # State Machine
//!
//! ```text
//! ┌───────────┐  ENCRYPT exchanged   ┌───────────┐  key + IV received  ┌───────────┐
//! │ Plaintext │─────────────────────>│ RsaActive │────────────────────>│ AesActive │
//! └───────────┘                      └───────────┘                     └───────────┘
//!       │                                  │
//!       │ violation                        │ violation
//!       ▼                                  ▼
//!              raw channel closed, error surfaced
//! ```
//!
//! Both ends of the sequence live here: [`Handshake::initiate`] is the
//! connecting party, [`Handshake::respond`] the accepting party that
//! generates and ships the session key. Each step blocks on a send followed
//! by a blocking receive; there is no concurrent in-flight step, so no locks
//! are needed within one connection's handshake.
//!
//! Failure semantics: every failure is fatal to the connection attempt.
//! There is no retry and no silent downgrade to plaintext; the raw channel is
//! closed before the error is surfaced to the caller.

use cloakwire_crypto::{
    PeerPublicKey, RSA_KEY_BITS, RsaKeypair, SESSION_IV_SIZE, SESSION_KEY_SIZE, SessionKey,
};
use cloakwire_proto::Envelope;
use rand::rngs::OsRng;
use tracing::debug;

use crate::{
    channel::{RawChannel, SecureChannel},
    error::ChannelError,
};

/// Handshake phase.
///
/// `AesActive` is terminal for this core; authentication and all later
/// traffic are the caller's concern, through the returned channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakePhase {
    /// No transform installed; only `ENCRYPT` envelopes are legal.
    Plaintext,
    /// Asymmetric bootstrap active; only raw key material is legal.
    RsaActive,
    /// Symmetric session active; the channel belongs to the caller.
    AesActive,
}

/// Handshake configuration.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// RSA key size for the ephemeral bootstrap keypair.
    ///
    /// Production stays at [`RSA_KEY_BITS`]; tests shrink it because 4096-bit
    /// prime generation dominates their runtime through the exact same code
    /// path.
    pub rsa_key_bits: usize,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self { rsa_key_bits: RSA_KEY_BITS }
    }
}

/// Result of one handshake step: the escalated channel, or the error paired
/// with the channel so the driver can close it before surfacing.
type StepResult = Result<SecureChannel, (ChannelError, SecureChannel)>;

/// Orchestrates one connection's escalation sequence.
///
/// One instance per connection, consumed by [`Handshake::run_initiator`] or
/// [`Handshake::run_responder`]. The transform chain it evolves is owned and
/// returned on success; no other task may touch the channel until then,
/// because intermediate states are not safe for concurrent send/recv.
#[derive(Debug)]
pub struct Handshake {
    phase: HandshakePhase,
    config: HandshakeConfig,
}

impl Handshake {
    /// Create an orchestrator in [`HandshakePhase::Plaintext`].
    #[must_use]
    pub fn new(config: HandshakeConfig) -> Self {
        Self { phase: HandshakePhase::Plaintext, config }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> HandshakePhase {
        self.phase
    }

    /// Run the connecting party's handshake with default configuration.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::HandshakeViolation`] if the peer deviates from the
    ///   fixed sequence or ships mis-sized key material
    /// - [`ChannelError::Protocol`] if a handshake envelope fails to parse
    /// - [`ChannelError::Transport`] if the underlying channel fails
    ///
    /// On any error the raw channel is closed before this returns.
    pub fn initiate(raw: impl RawChannel + 'static) -> Result<SecureChannel, ChannelError> {
        Self::new(HandshakeConfig::default()).run_initiator(raw)
    }

    /// Run the accepting party's handshake with default configuration.
    ///
    /// # Errors
    ///
    /// Same as [`Handshake::initiate`].
    pub fn respond(raw: impl RawChannel + 'static) -> Result<SecureChannel, ChannelError> {
        Self::new(HandshakeConfig::default()).run_responder(raw)
    }

    /// Drive the full initiator sequence over a raw channel.
    pub fn run_initiator(
        mut self,
        raw: impl RawChannel + 'static,
    ) -> Result<SecureChannel, ChannelError> {
        let channel = SecureChannel::plain(raw);
        let channel = close_on_error(self.bootstrap_asymmetric_initiator(channel))?;
        let channel = close_on_error(self.establish_session_initiator(channel))?;

        debug_assert_eq!(self.phase, HandshakePhase::AesActive);
        debug!(layer = channel.layer(), "handshake complete");
        Ok(channel)
    }

    /// Drive the full responder sequence over a raw channel.
    pub fn run_responder(
        mut self,
        raw: impl RawChannel + 'static,
    ) -> Result<SecureChannel, ChannelError> {
        let channel = SecureChannel::plain(raw);
        let channel = close_on_error(self.bootstrap_asymmetric_responder(channel))?;
        let channel = close_on_error(self.establish_session_responder(channel))?;

        debug_assert_eq!(self.phase, HandshakePhase::AesActive);
        debug!(layer = channel.layer(), "handshake complete");
        Ok(channel)
    }

    /// `Plaintext -> RsaActive`, connecting party.
    ///
    /// Sends the local public key parameters, expects the peer's in return,
    /// and installs the asymmetric transform. Any reply that is not an
    /// `ENCRYPT` envelope is a violation.
    fn bootstrap_asymmetric_initiator(&mut self, mut channel: SecureChannel) -> StepResult {
        if self.phase != HandshakePhase::Plaintext {
            return Err((self.violation("asymmetric bootstrap run twice"), channel));
        }

        let local = match RsaKeypair::generate_with_size(&mut OsRng, self.config.rsa_key_bits) {
            Ok(keypair) => keypair,
            Err(err) => return Err((err.into(), channel)),
        };

        let (exponent, modulus) = local.public_numbers();
        if let Err(err) = channel.send_envelope(&Envelope::encrypt(exponent, modulus)) {
            return Err((err, channel));
        }
        debug!("sent local public key parameters");

        let reply = match channel.recv_envelope() {
            Ok(envelope) => envelope,
            Err(err) => return Err((err, channel)),
        };
        let Envelope::Encrypt(payload) = reply else {
            let detail = format!("expected ENCRYPT, peer sent {}", reply.kind());
            return Err((self.violation(detail), channel));
        };

        let peer = match PeerPublicKey::from_decimal(&payload.exponent, &payload.modulus) {
            Ok(key) => key,
            Err(err) => {
                let detail = format!("peer public key rejected: {err}");
                return Err((self.violation(detail), channel));
            },
        };

        self.phase = HandshakePhase::RsaActive;
        debug!("asymmetric transform installed");
        Ok(channel.with_rsa(local, peer))
    }

    /// `Plaintext -> RsaActive`, accepting party.
    ///
    /// Expects the peer's `ENCRYPT` first, replies with the local public key
    /// parameters, and installs the asymmetric transform.
    fn bootstrap_asymmetric_responder(&mut self, mut channel: SecureChannel) -> StepResult {
        if self.phase != HandshakePhase::Plaintext {
            return Err((self.violation("asymmetric bootstrap run twice"), channel));
        }

        let first = match channel.recv_envelope() {
            Ok(envelope) => envelope,
            Err(err) => return Err((err, channel)),
        };
        let Envelope::Encrypt(payload) = first else {
            let detail = format!("expected ENCRYPT, peer sent {}", first.kind());
            return Err((self.violation(detail), channel));
        };

        let peer = match PeerPublicKey::from_decimal(&payload.exponent, &payload.modulus) {
            Ok(key) => key,
            Err(err) => {
                let detail = format!("peer public key rejected: {err}");
                return Err((self.violation(detail), channel));
            },
        };

        let local = match RsaKeypair::generate_with_size(&mut OsRng, self.config.rsa_key_bits) {
            Ok(keypair) => keypair,
            Err(err) => return Err((err.into(), channel)),
        };

        let (exponent, modulus) = local.public_numbers();
        if let Err(err) = channel.send_envelope(&Envelope::encrypt(exponent, modulus)) {
            return Err((err, channel));
        }

        self.phase = HandshakePhase::RsaActive;
        debug!("asymmetric transform installed");
        Ok(channel.with_rsa(local, peer))
    }

    /// `RsaActive -> AesActive`, connecting party.
    ///
    /// Receives the session key and IV as two raw frames under the
    /// asymmetric layer. Length validation is a security boundary: anything
    /// other than exactly 32 + 16 bytes fails the handshake without
    /// installing the symmetric transform.
    fn establish_session_initiator(&mut self, mut channel: SecureChannel) -> StepResult {
        if self.phase != HandshakePhase::RsaActive {
            return Err((self.violation("session establishment before bootstrap"), channel));
        }

        let key = match channel.recv() {
            Ok(bytes) => bytes,
            Err(err) => return Err((err, channel)),
        };
        let iv = match channel.recv() {
            Ok(bytes) => bytes,
            Err(err) => return Err((err, channel)),
        };

        if key.len() != SESSION_KEY_SIZE || iv.len() != SESSION_IV_SIZE {
            let detail = format!(
                "key material sized {}/{} bytes, expected {SESSION_KEY_SIZE}/{SESSION_IV_SIZE}",
                key.len(),
                iv.len()
            );
            return Err((self.violation(detail), channel));
        }
        let session = match SessionKey::from_parts(&key, &iv) {
            Ok(session) => session,
            Err(err) => return Err((self.violation(err.to_string()), channel)),
        };

        self.phase = HandshakePhase::AesActive;
        debug!("symmetric transform installed");
        Ok(channel.with_aes(session))
    }

    /// `RsaActive -> AesActive`, accepting party.
    ///
    /// Generates a fresh session key and ships key then IV as two raw frames
    /// under the asymmetric layer, then installs the symmetric transform.
    fn establish_session_responder(&mut self, mut channel: SecureChannel) -> StepResult {
        if self.phase != HandshakePhase::RsaActive {
            return Err((self.violation("session establishment before bootstrap"), channel));
        }

        let session = SessionKey::generate(&mut OsRng);
        if let Err(err) = channel.send(session.key()) {
            return Err((err, channel));
        }
        if let Err(err) = channel.send(session.iv()) {
            return Err((err, channel));
        }

        self.phase = HandshakePhase::AesActive;
        debug!("symmetric transform installed");
        Ok(channel.with_aes(session))
    }

    fn violation(&self, detail: impl Into<String>) -> ChannelError {
        ChannelError::HandshakeViolation { phase: self.phase, detail: detail.into() }
    }
}

/// Close the raw connection before surfacing a step failure.
///
/// A failed handshake must never leave a half-secured connection open: the
/// peer could otherwise keep talking through whatever layer happened to be
/// active when the sequence broke.
fn close_on_error(step: StepResult) -> Result<SecureChannel, ChannelError> {
    step.map_err(|(err, mut channel)| {
        let _ = channel.close();
        err
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_plaintext() {
        let handshake = Handshake::new(HandshakeConfig::default());
        assert_eq!(handshake.phase(), HandshakePhase::Plaintext);
    }

    #[test]
    fn default_config_uses_wire_key_size() {
        assert_eq!(HandshakeConfig::default().rsa_key_bits, RSA_KEY_BITS);
    }
}
