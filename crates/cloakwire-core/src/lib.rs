//! Cloakwire channel core.
//!
//! Takes a raw byte-stream connection from plaintext to a symmetric-secured,
//! envelope-oriented channel:
//!
//! 1. [`channel::SecureChannel`] - the composable transform chain. Each
//!    cipher layer owns the channel it wraps, so installing a layer is a move
//!    and a stale, already-superseded layer is unrepresentable.
//! 2. [`handshake::Handshake`] - the fixed escalation sequence
//!    `Plaintext -> RsaActive -> AesActive`. There is no cipher negotiation
//!    and no downgrade: any failure closes the connection.
//! 3. [`framed`] / [`memory`] - raw-channel implementations: length-prefixed
//!    TCP for production, an in-memory duplex pair for tests.
//!
//! The handshake is strictly sequential and blocking relative to a single
//! connection. One connection owns one orchestrator and one transform chain;
//! callers wanting timeouts impose them on the underlying stream.

pub mod channel;
pub mod error;
pub mod framed;
pub mod handshake;
pub mod memory;

pub use channel::{RawChannel, SecureChannel};
pub use error::ChannelError;
pub use framed::FramedTcp;
pub use handshake::{Handshake, HandshakeConfig, HandshakePhase};
pub use memory::{CloseWitness, MemoryChannel};
