//! Cloakwire connecting-party front-end.
//!
//! Wraps the channel core for callers that just want a secured, authenticated
//! connection: connect over TCP, run the initiator handshake, present the
//! `AUTH` envelope, exchange typed envelopes. All protocol-state logic lives
//! in `cloakwire-core`; this crate only sequences it.

pub mod client;

pub use client::{Client, ClientError, ConnectionMode, DEFAULT_PORT};
