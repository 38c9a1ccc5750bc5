//! Error types for envelope encoding and decoding.

use thiserror::Error;

/// Convenience alias for codec results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors produced by the envelope codec.
///
/// Both decode failures are fatal to the current exchange but not to the
/// process: the caller decides whether to drop the connection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Payload is not a well-formed envelope: invalid JSON, not an object,
    /// missing the `type` discriminant, or missing/mistyped required fields.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// The `type` discriminant is outside the closed envelope kind set.
    #[error("unknown message kind: {0:?}")]
    UnknownMessageKind(String),

    /// Envelope could not be serialized.
    ///
    /// Only reachable with pathological field values (e.g. a non-string-keyed
    /// map smuggled into a `VALUE` payload); never for envelopes built through
    /// the constructors in this crate.
    #[error("envelope encoding failed: {0}")]
    Encode(String),
}
