//! Client connection sequencing.
//!
//! Order of operations on connect: TCP stream up, handshake to `AesActive`,
//! `AUTH` envelope through the secured channel, then the connection belongs
//! to the caller. A handshake failure aborts the attempt entirely; no
//! partial or degraded channel is ever handed out.

use std::net::ToSocketAddrs;

use cloakwire_core::{
    ChannelError, FramedTcp, Handshake, HandshakeConfig, RawChannel, SecureChannel,
};
use cloakwire_proto::{AuthMode, Envelope};
use thiserror::Error;
use tracing::debug;

/// Default server port.
pub const DEFAULT_PORT: u16 = 19055;

/// Errors surfaced while establishing or using a client connection.
#[derive(Error, Debug)]
pub enum ClientError {
    /// TCP connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Handshake or secured-channel failure.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

/// Credentials and identity presented once the channel is secured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMode {
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

impl ConnectionMode {
    /// Credentials for an existing account.
    pub fn login(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        discord_userid: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self::with_mode(AuthMode::Login, name, email, password, discord_userid, agent)
    }

    /// Credentials for a new account.
    pub fn signup(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        discord_userid: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self::with_mode(AuthMode::Signup, name, email, password, discord_userid, agent)
    }

    fn with_mode(
        mode: AuthMode,
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        discord_userid: impl Into<String>,
        agent: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            name: name.into(),
            email: email.into(),
            password: password.into(),
            discord_userid: discord_userid.into(),
            agent: agent.into(),
        }
    }

    /// The `AUTH` envelope these credentials produce.
    #[must_use]
    pub fn to_envelope(&self) -> Envelope {
        Envelope::auth(
            self.mode,
            self.name.clone(),
            self.email.clone(),
            self.password.clone(),
            self.discord_userid.clone(),
            self.agent.clone(),
        )
    }
}

/// A secured, authenticated client connection.
#[derive(Debug)]
pub struct Client {
    channel: SecureChannel,
}

impl Client {
    /// Connect over TCP, secure the channel, and present credentials.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Connect`] if the TCP connection fails
    /// - [`ClientError::Channel`] if the handshake fails (the connection is
    ///   already closed when this surfaces) or the `AUTH` send fails
    pub fn connect(addr: impl ToSocketAddrs, mode: &ConnectionMode) -> Result<Self, ClientError> {
        let raw = FramedTcp::connect(addr).map_err(|e| ClientError::Connect(e.to_string()))?;
        Self::over(raw, mode)
    }

    /// Secure an already-established raw channel and present credentials.
    pub fn over(raw: impl RawChannel + 'static, mode: &ConnectionMode) -> Result<Self, ClientError> {
        Self::over_with(raw, mode, HandshakeConfig::default())
    }

    /// [`Client::over`] with explicit handshake configuration.
    pub fn over_with(
        raw: impl RawChannel + 'static,
        mode: &ConnectionMode,
        config: HandshakeConfig,
    ) -> Result<Self, ClientError> {
        let mut channel = Handshake::new(config).run_initiator(raw)?;
        debug!(layer = channel.layer(), "channel secured, presenting credentials");

        channel.send_envelope(&mode.to_envelope())?;
        Ok(Self { channel })
    }

    /// Send an envelope through the secured channel.
    pub fn send(&mut self, envelope: &Envelope) -> Result<(), ClientError> {
        Ok(self.channel.send_envelope(envelope)?)
    }

    /// Block until the server's next envelope arrives.
    pub fn recv(&mut self) -> Result<Envelope, ClientError> {
        Ok(self.channel.recv_envelope()?)
    }

    /// Hand the secured channel to a higher-level dispatch layer.
    #[must_use]
    pub fn into_channel(self) -> SecureChannel {
        self.channel
    }
}
