//! Client-level end-to-end test over the in-memory transport.
//!
//! Drives the whole connecting-party sequence against a real responder: both
//! cipher layers come up, the AUTH envelope goes out automatically, and the
//! peer observes the exact credential fields that were configured.

use cloakwire_client::{Client, ConnectionMode};
use cloakwire_core::{Handshake, HandshakeConfig, MemoryChannel};
use cloakwire_proto::{AuthMode, Envelope, StatusCode, StatusMode};

/// Small key for test speed; production uses `RSA_KEY_BITS`.
const TEST_BITS: usize = 1024;

#[test]
fn connect_secures_and_authenticates() {
    let (client_raw, server_raw) = MemoryChannel::pair();

    let server = std::thread::spawn(move || {
        let mut channel = Handshake::new(HandshakeConfig { rsa_key_bits: TEST_BITS })
            .run_responder(server_raw)
            .unwrap();

        // First envelope through the secured channel must be the credentials
        let Envelope::Auth(auth) = channel.recv_envelope().unwrap() else {
            unreachable!("expected AUTH");
        };
        channel
            .send_envelope(&Envelope::status(StatusMode::Ok, StatusCode::Done, "welcome"))
            .unwrap();
        auth
    });

    let mode = ConnectionMode::login("alice", "alice@example.com", "hunter2", "42", "itest/1");
    let mut client = Client::over_with(
        client_raw,
        &mode,
        HandshakeConfig { rsa_key_bits: TEST_BITS },
    )
    .unwrap();

    let Envelope::Status(status) = client.recv().unwrap() else {
        unreachable!("expected STATUS");
    };
    assert_eq!(status.mode, StatusMode::Ok);
    assert_eq!(status.code, StatusCode::Done);

    let auth = server.join().unwrap();
    assert_eq!(auth.mode, AuthMode::Login);
    assert_eq!(auth.name, "alice");
    assert_eq!(auth.email, "alice@example.com");
    assert_eq!(auth.password, "hunter2");
    assert_eq!(auth.discord_userid, "42");
    assert_eq!(auth.agent, "itest/1");
}

#[test]
fn traffic_flows_both_ways_after_connect() {
    let (client_raw, server_raw) = MemoryChannel::pair();

    let server = std::thread::spawn(move || {
        let mut channel = Handshake::new(HandshakeConfig { rsa_key_bits: TEST_BITS })
            .run_responder(server_raw)
            .unwrap();
        let _auth = channel.recv_envelope().unwrap();

        let Envelope::Value(request) = channel.recv_envelope().unwrap() else {
            unreachable!("expected VALUE");
        };
        channel
            .send_envelope(&Envelope::value(request.name, serde_json::json!(1337)))
            .unwrap();
    });

    let mode = ConnectionMode::signup("bob", "bob@example.com", "pw", "7", "itest/1");
    let mut client = Client::over_with(
        client_raw,
        &mode,
        HandshakeConfig { rsa_key_bits: TEST_BITS },
    )
    .unwrap();

    client.send(&Envelope::value("balance", serde_json::Value::Null)).unwrap();
    let Envelope::Value(reply) = client.recv().unwrap() else {
        unreachable!("expected VALUE");
    };
    assert_eq!(reply.name, "balance");
    assert_eq!(reply.value, serde_json::json!(1337));

    server.join().unwrap();
}
