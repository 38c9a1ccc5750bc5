//! Property-based tests for envelope encoding/decoding.
//!
//! These verify that the codec round-trips ALL representable envelopes, not
//! just hand-picked examples. Scalars stay within JSON-exact types (strings,
//! integers, booleans, null); floats are excluded because the wire format
//! never carries them and they have no exact round-trip guarantee.

use cloakwire_proto::{
    AuthMode, ChartSeries, Envelope, ProtocolError, StatusCode, StatusMode,
};
use proptest::prelude::*;
use serde_json::Value;

/// Strategy for JSON-exact scalar values.
fn arbitrary_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _.:-]{0,24}".prop_map(Value::from),
    ]
}

fn arbitrary_auth_mode() -> impl Strategy<Value = AuthMode> {
    prop_oneof![Just(AuthMode::Login), Just(AuthMode::Signup)]
}

fn arbitrary_status() -> impl Strategy<Value = (StatusMode, StatusCode)> {
    (
        prop_oneof![Just(StatusMode::Ok), Just(StatusMode::Err)],
        prop_oneof![
            Just(StatusCode::Done),
            Just(StatusCode::Exc),
            Just(StatusCode::Bad),
            Just(StatusCode::Ver),
            Just(StatusCode::Deny),
        ],
    )
}

/// Strategy for decimal-string integers wider than any native type.
fn arbitrary_decimal_string() -> impl Strategy<Value = String> {
    "[1-9][0-9]{0,1300}"
}

fn arbitrary_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 _.-]{0,32}"
}

/// Strategy for every leaf envelope kind (everything except MULTI).
fn arbitrary_leaf_envelope() -> impl Strategy<Value = Envelope> {
    prop_oneof![
        (arbitrary_decimal_string(), arbitrary_decimal_string())
            .prop_map(|(e, n)| Envelope::encrypt(e, n)),
        (
            arbitrary_auth_mode(),
            arbitrary_text(),
            arbitrary_text(),
            arbitrary_text(),
            arbitrary_text(),
            arbitrary_text(),
        )
            .prop_map(|(mode, name, email, password, discord, agent)| {
                Envelope::auth(mode, name, email, password, discord, agent)
            }),
        (arbitrary_status(), arbitrary_scalar())
            .prop_map(|((mode, code), message)| Envelope::status(mode, code, message)),
        (arbitrary_text(), arbitrary_scalar()).prop_map(|(name, value)| {
            Envelope::value(name, value)
        }),
        (
            arbitrary_text(),
            prop::collection::vec(arbitrary_text(), 0..4),
            prop::collection::vec(prop::collection::vec(arbitrary_scalar(), 0..4), 0..4),
        )
            .prop_map(|(title, columns, rows)| Envelope::table(title, columns, rows)),
        (
            arbitrary_text(),
            arbitrary_text(),
            arbitrary_text(),
            arbitrary_text(),
            prop::collection::vec(
                (
                    arbitrary_text(),
                    prop::collection::vec(arbitrary_scalar(), 0..4),
                    prop::collection::vec(arbitrary_scalar(), 0..4),
                )
                    .prop_map(|(name, x, y)| ChartSeries { name, x, y }),
                0..3,
            ),
        )
            .prop_map(|(title, xformat, xlabel, ylabel, series)| {
                Envelope::chart(title, xformat, xlabel, ylabel, series)
            }),
    ]
}

/// Strategy for any envelope, including one level of MULTI nesting.
fn arbitrary_envelope() -> impl Strategy<Value = Envelope> {
    prop_oneof![
        arbitrary_leaf_envelope(),
        prop::collection::vec(arbitrary_leaf_envelope(), 0..4).prop_map(Envelope::multi),
    ]
}

proptest! {
    #[test]
    fn envelope_round_trip(envelope in arbitrary_envelope()) {
        let wire = envelope.encode().expect("should encode");
        let parsed = Envelope::decode(&wire).expect("should decode");
        prop_assert_eq!(envelope, parsed);
    }

    #[test]
    fn wire_form_is_utf8_text(envelope in arbitrary_envelope()) {
        let wire = envelope.encode().expect("should encode");
        prop_assert!(std::str::from_utf8(&wire).is_ok());
    }

    #[test]
    fn unknown_discriminants_always_rejected(kind in "[A-Z]{3,12}") {
        prop_assume!(!["ENCRYPT", "AUTH", "STATUS", "VALUE", "TABLE", "CHART", "MULTI"]
            .contains(&kind.as_str()));

        let wire = format!(r#"{{"type": "{kind}"}}"#);
        let err = Envelope::decode(wire.as_bytes()).expect_err("must reject");
        prop_assert_eq!(err, ProtocolError::UnknownMessageKind(kind));
    }

    #[test]
    fn truncation_never_panics(envelope in arbitrary_envelope(), cut in 0usize..64) {
        let wire = envelope.encode().expect("should encode");
        let cut = cut.min(wire.len());
        // Any prefix must either decode (cut == 0) or fail cleanly.
        let _ = Envelope::decode(&wire[..wire.len() - cut]);
    }
}
