//! Cloakwire wire envelope codec.
//!
//! Every exchange between a Cloakwire client and server, both during and after
//! the channel handshake, is a tagged JSON record: an object with a `type`
//! discriminant plus type-specific fields. The codec is stateless; each
//! envelope is constructed fresh per send and is fully self-describing.
//!
//! We chose JSON over binary alternatives because envelopes are small, the
//! peers are heterogeneous, and the format must survive implementations with
//! different integer-width limits. The RSA exponent and modulus in particular
//! travel as decimal strings, never as native numbers, so no peer can lose
//! precision parsing them.
//!
//! # Invariants
//!
//! - Round-trip: `Envelope::decode(&e.encode()?)` reproduces `e` for every
//!   supported envelope kind and field shape.
//! - Closed discriminant set: decoding a `type` outside
//!   `ENCRYPT, AUTH, STATUS, VALUE, TABLE, CHART, MULTI` fails with
//!   [`ProtocolError::UnknownMessageKind`], never a silent skip.
//! - The `version` field on `ENCRYPT` and `AUTH` is carried verbatim; version
//!   policy belongs to callers, not the codec.

pub mod envelope;
pub mod errors;

pub use envelope::{
    AuthMode, AuthPayload, ChartPayload, ChartSeries, EncryptPayload, Envelope, MultiPayload,
    StatusCode, StatusMode, StatusPayload, TablePayload, ValuePayload,
};
pub use errors::{ProtocolError, Result};

/// Protocol version carried on `ENCRYPT` and `AUTH` envelopes.
pub const PROTOCOL_VERSION: &str = "1.1.0";
