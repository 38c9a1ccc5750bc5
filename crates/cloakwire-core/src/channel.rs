//! Composable channel transform chain.
//!
//! A [`SecureChannel`] wraps a byte-oriented [`RawChannel`] so that outbound
//! payloads are encrypted before the underlying send and inbound payloads are
//! decrypted after the underlying receive, transparently to callers that only
//! know "send bytes / receive bytes".
//!
//! The chain is a tagged union over an owned inner channel rather than a
//! decorator holding a shared reference: installing a new layer consumes the
//! previous channel by move, so exactly one chain is active at any time and
//! nothing can send through a stale, less-secure layer once a newer one is
//! installed.

use std::io;

use cloakwire_crypto::{PeerPublicKey, RsaKeypair, SessionKey};
use cloakwire_proto::Envelope;
use rand::rngs::OsRng;

use crate::error::ChannelError;

/// A byte-oriented channel with reliable, ordered, exactly-once delivery of
/// whole frames.
///
/// Implementations own the framing; no partial-frame semantics are exposed
/// upward. See [`crate::framed::FramedTcp`] for the production transport and
/// [`crate::memory::MemoryChannel`] for the in-process test double.
pub trait RawChannel: Send {
    /// Send one whole frame.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Block until one whole frame arrives.
    fn recv(&mut self) -> io::Result<Vec<u8>>;

    /// Tear down the underlying connection.
    fn close(&mut self) -> io::Result<()>;
}

/// The active transform chain over a raw channel.
///
/// # Invariants
///
/// - Exactly one chain is active per connection; layer installation consumes
///   `self` (enforced by ownership, not at runtime).
/// - The asymmetric layer only ever carries small fixed-size secrets; the
///   handshake discards it once the symmetric layer is installed
///   ([`SecureChannel::with_aes`]).
pub enum SecureChannel {
    /// Pass-through: no transform installed yet.
    Plain(Box<dyn RawChannel>),

    /// Asymmetric bootstrap layer: outbound under the peer's public key,
    /// inbound under the local private key, OAEP-SHA256 both ways.
    Rsa {
        /// Wrapped channel.
        inner: Box<SecureChannel>,
        /// Local keypair; decrypts inbound secrets.
        local: RsaKeypair,
        /// Peer's reconstructed public key; encrypts outbound secrets.
        peer: PeerPublicKey,
    },

    /// Symmetric session layer: AES-256-CBC with PKCS#7 padding, same
    /// key/IV for the channel's entire lifetime.
    Aes {
        /// Wrapped channel.
        inner: Box<SecureChannel>,
        /// Session secret shared with the peer.
        session: SessionKey,
    },
}

impl SecureChannel {
    /// Wrap a raw channel with no transform.
    pub fn plain(raw: impl RawChannel + 'static) -> Self {
        Self::Plain(Box::new(raw))
    }

    /// Install the asymmetric bootstrap layer, consuming the current chain.
    #[must_use]
    pub fn with_rsa(self, local: RsaKeypair, peer: PeerPublicKey) -> Self {
        Self::Rsa { inner: Box::new(self), local, peer }
    }

    /// Install the symmetric session layer, consuming the current chain.
    ///
    /// If the outermost layer is the asymmetric bootstrap, it is discarded
    /// and the session layer takes over its inner channel directly: the
    /// bootstrap layer is never reused after the session is established, and
    /// the session cipher must delegate to the raw transport, not re-wrap a
    /// dead cipher.
    #[must_use]
    pub fn with_aes(self, session: SessionKey) -> Self {
        let inner = match self {
            Self::Rsa { inner, .. } => inner,
            other => Box::new(other),
        };
        Self::Aes { inner, session }
    }

    /// Name of the outermost active layer, for diagnostics.
    #[must_use]
    pub const fn layer(&self) -> &'static str {
        match self {
            Self::Plain(_) => "plain",
            Self::Rsa { .. } => "rsa",
            Self::Aes { .. } => "aes",
        }
    }

    /// Transform and send one payload.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::Security`] on a cryptographic failure (e.g. the
    ///   payload exceeds the asymmetric layer's plaintext bound)
    /// - [`ChannelError::Transport`] if the underlying channel fails
    pub fn send(&mut self, plaintext: &[u8]) -> Result<(), ChannelError> {
        match self {
            Self::Plain(raw) => Ok(raw.send(plaintext)?),
            Self::Rsa { inner, peer, .. } => {
                let ciphertext = peer.encrypt(&mut OsRng, plaintext)?;
                inner.send(&ciphertext)
            },
            Self::Aes { inner, session } => inner.send(&session.encrypt(plaintext)),
        }
    }

    /// Receive one payload and transform it back to plaintext.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::Security`] on malformed ciphertext or padding
    ///   validation failure; no partial recovery is attempted
    /// - [`ChannelError::Transport`] if the underlying channel fails
    pub fn recv(&mut self) -> Result<Vec<u8>, ChannelError> {
        match self {
            Self::Plain(raw) => Ok(raw.recv()?),
            Self::Rsa { inner, local, .. } => {
                let ciphertext = inner.recv()?;
                Ok(local.decrypt(&ciphertext)?)
            },
            Self::Aes { inner, session } => {
                let ciphertext = inner.recv()?;
                Ok(session.decrypt(&ciphertext)?)
            },
        }
    }

    /// Encode and send an envelope through the active transform chain.
    pub fn send_envelope(&mut self, envelope: &Envelope) -> Result<(), ChannelError> {
        let wire = envelope.encode().map_err(ChannelError::Protocol)?;
        self.send(&wire)
    }

    /// Receive and decode an envelope through the active transform chain.
    pub fn recv_envelope(&mut self) -> Result<Envelope, ChannelError> {
        let wire = self.recv()?;
        Ok(Envelope::decode(&wire)?)
    }

    /// Tear down the underlying raw connection, whatever is stacked on it.
    pub fn close(&mut self) -> Result<(), ChannelError> {
        match self {
            Self::Plain(raw) => Ok(raw.close()?),
            Self::Rsa { inner, .. } | Self::Aes { inner, .. } => inner.close(),
        }
    }
}

impl std::fmt::Debug for SecureChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureChannel").field("layer", &self.layer()).finish_non_exhaustive()
    }
}
