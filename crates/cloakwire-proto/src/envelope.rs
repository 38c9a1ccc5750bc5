//! Tagged envelope types and the JSON codec.
//!
//! The `type` discriminant is carried inline in the JSON object
//! (`{"type": "AUTH", ...}`), so an [`Envelope`] serializes to exactly the
//! wire shape with no wrapper. Construction helpers mirror the envelope kinds
//! one-to-one; callers that only relay envelopes never need to touch the
//! payload structs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    PROTOCOL_VERSION,
    errors::{ProtocolError, Result},
};

/// Authentication mode requested by an `AUTH` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuthMode {
    /// Authenticate an existing account.
    Login,
    /// Create a new account.
    Signup,
}

/// Outcome class of a `STATUS` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusMode {
    /// The request succeeded.
    Ok,
    /// The request failed.
    Err,
}

/// Fine-grained status code of a `STATUS` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusCode {
    /// Operation completed.
    Done,
    /// Server-side exception.
    Exc,
    /// Malformed or invalid request.
    Bad,
    /// Protocol version mismatch.
    Ver,
    /// Permission denied.
    Deny,
}

/// Public key parameters exchanged during the handshake bootstrap.
///
/// Exponent and modulus are decimal strings: a 4096-bit modulus does not fit
/// any native integer type, and JSON numbers are not portable at that width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptPayload {
    /// Protocol version of the sender, preserved verbatim.
    pub version: String,
    /// RSA public exponent as a decimal string.
    pub exponent: String,
    /// RSA public modulus as a decimal string.
    pub modulus: String,
}

/// Credentials presented after the channel is secured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPayload {
    /// Protocol version of the sender, preserved verbatim.
    pub version: String,
    /// Login or signup.
    pub mode: AuthMode,
    /// Account name.
    pub name: String,
    /// Account email address.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Associated Discord user id.
    pub discord_userid: String,
    /// Client agent string.
    pub agent: String,
}

/// Request outcome report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Outcome class.
    pub mode: StatusMode,
    /// Fine-grained status code.
    pub code: StatusCode,
    /// Human-readable string or structured detail.
    pub message: Value,
}

/// Single named value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePayload {
    /// Value name.
    pub name: String,
    /// Any serializable scalar or structure.
    pub value: Value,
}

/// Tabular data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePayload {
    /// Table title.
    pub title: String,
    /// Ordered column headers.
    pub columns: Vec<String>,
    /// Ordered rows; each row is an ordered sequence of cells.
    pub rows: Vec<Vec<Value>>,
}

/// One series of a `CHART` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Series name.
    pub name: String,
    /// X-axis values.
    pub x: Vec<Value>,
    /// Y-axis values.
    pub y: Vec<Value>,
}

/// Chart data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPayload {
    /// Chart title.
    pub title: String,
    /// X-axis value format hint.
    pub xformat: String,
    /// X-axis label.
    pub xlabel: String,
    /// Y-axis label.
    pub ylabel: String,
    /// Ordered data series.
    pub series: Vec<ChartSeries>,
}

/// Ordered batch of nested envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPayload {
    /// Nested envelopes, delivered in order.
    pub messages: Vec<Envelope>,
}

/// A complete wire envelope.
///
/// The variant is the `type` discriminant; the payload fields are flattened
/// into the same JSON object.
///
/// # Invariants
///
/// - Each variant maps to exactly one discriminant string (enforced by the
///   serde tag; [`Envelope::kind`] is the reverse mapping).
/// - `decode(encode(e)) == e` for every envelope constructible through this
///   crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Envelope {
    /// Handshake bootstrap: public key parameters.
    Encrypt(EncryptPayload),
    /// Post-handshake authentication request.
    Auth(AuthPayload),
    /// Request outcome report.
    Status(StatusPayload),
    /// Single named value.
    Value(ValuePayload),
    /// Tabular data.
    Table(TablePayload),
    /// Chart data.
    Chart(ChartPayload),
    /// Ordered batch of nested envelopes.
    Multi(MultiPayload),
}

/// The closed set of wire discriminants.
const KNOWN_KINDS: [&str; 7] = ["ENCRYPT", "AUTH", "STATUS", "VALUE", "TABLE", "CHART", "MULTI"];

impl Envelope {
    /// Wire discriminant for this envelope.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Encrypt(_) => "ENCRYPT",
            Self::Auth(_) => "AUTH",
            Self::Status(_) => "STATUS",
            Self::Value(_) => "VALUE",
            Self::Table(_) => "TABLE",
            Self::Chart(_) => "CHART",
            Self::Multi(_) => "MULTI",
        }
    }

    /// Serialize to the UTF-8 JSON wire form.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::Encode`] if serialization fails; unreachable for
    ///   envelopes built through the constructors in this crate.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    /// Parse an envelope from its wire form.
    ///
    /// Validation happens in two stages: first structural (valid JSON object
    /// with a string `type`), then the discriminant against the closed kind
    /// set, and only then the per-kind fields. This keeps the two failure
    /// classes distinct for callers that care which boundary was violated.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::MalformedEnvelope`] for invalid JSON, a non-object
    ///   payload, a missing `type`, or missing/mistyped per-kind fields
    /// - [`ProtocolError::UnknownMessageKind`] for a discriminant outside the
    ///   closed set
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))?;

        let Some(object) = value.as_object() else {
            return Err(ProtocolError::MalformedEnvelope("payload is not a JSON object".into()));
        };

        let Some(kind) = object.get("type").and_then(Value::as_str) else {
            return Err(ProtocolError::MalformedEnvelope(
                "missing `type` discriminant".into(),
            ));
        };

        if !KNOWN_KINDS.contains(&kind) {
            return Err(ProtocolError::UnknownMessageKind(kind.to_owned()));
        }

        serde_json::from_value(value).map_err(|e| ProtocolError::MalformedEnvelope(e.to_string()))
    }

    /// Build an `ENCRYPT` envelope from decimal-string key parameters.
    ///
    /// The `version` field is stamped with [`PROTOCOL_VERSION`].
    pub fn encrypt(exponent: impl Into<String>, modulus: impl Into<String>) -> Self {
        Self::Encrypt(EncryptPayload {
            version: PROTOCOL_VERSION.to_owned(),
            exponent: exponent.into(),
            modulus: modulus.into(),
        })
    }

    /// Build an `AUTH` envelope stamped with [`PROTOCOL_VERSION`].
    pub fn auth(
        mode: AuthMode,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        discord_userid: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self::Auth(AuthPayload {
            version: PROTOCOL_VERSION.to_owned(),
            mode,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            discord_userid: discord_userid.into(),
            agent: agent.into(),
        })
    }

    /// Build a `STATUS` envelope.
    pub fn status(mode: StatusMode, code: StatusCode, message: impl Into<Value>) -> Self {
        Self::Status(StatusPayload { mode, code, message: message.into() })
    }

    /// Build a `VALUE` envelope.
    pub fn value(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Value(ValuePayload { name: name.into(), value: value.into() })
    }

    /// Build a `TABLE` envelope.
    pub fn table(title: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self::Table(TablePayload { title: title.into(), columns, rows })
    }

    /// Build a `CHART` envelope.
    pub fn chart(
        title: impl Into<String>,
        xformat: impl Into<String>,
        xlabel: impl Into<String>,
        ylabel: impl Into<String>,
        series: Vec<ChartSeries>,
    ) -> Self {
        Self::Chart(ChartPayload {
            title: title.into(),
            xformat: xformat.into(),
            xlabel: xlabel.into(),
            ylabel: ylabel.into(),
            series,
        })
    }

    /// Build a `MULTI` envelope from nested envelopes.
    pub fn multi(messages: Vec<Envelope>) -> Self {
        Self::Multi(MultiPayload { messages })
    }
}
