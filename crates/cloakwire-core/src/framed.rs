//! Length-prefixed TCP transport.
//!
//! Wire layout per frame: `[length: u32 big-endian] + [payload bytes]`.
//! Blocking I/O throughout; the handshake is strictly sequential and callers
//! wanting timeouts set them on the stream before handing it over.

use std::{
    io::{self, Read, Write},
    net::{Shutdown, TcpStream, ToSocketAddrs},
};

use crate::channel::RawChannel;

/// Largest accepted frame (16 MB). Caps allocation from a hostile or
/// desynchronized peer before any payload bytes are read.
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Blocking length-prefixed framing over a TCP stream.
#[derive(Debug)]
pub struct FramedTcp {
    stream: TcpStream,
}

impl FramedTcp {
    /// Connect to a remote endpoint.
    ///
    /// # Errors
    ///
    /// - Any connection failure from the operating system
    pub fn connect(addr: impl ToSocketAddrs) -> io::Result<Self> {
        Ok(Self { stream: TcpStream::connect(addr)? })
    }

    /// Adopt an already-established stream (e.g. from an acceptor).
    #[must_use]
    pub fn from_stream(stream: TcpStream) -> Self {
        Self { stream }
    }
}

impl RawChannel for FramedTcp {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        let len = u32::try_from(frame.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "frame exceeds u32 length prefix")
        })?;
        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("frame of {len} bytes exceeds {MAX_FRAME_LEN} byte limit"),
            ));
        }

        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(frame)?;
        self.stream.flush()
    }

    fn recv(&mut self) -> io::Result<Vec<u8>> {
        let mut prefix = [0u8; 4];
        self.stream.read_exact(&mut prefix)?;

        let len = u32::from_be_bytes(prefix);
        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("peer announced {len} byte frame, limit is {MAX_FRAME_LEN}"),
            ));
        }

        let mut frame = vec![0u8; len as usize];
        self.stream.read_exact(&mut frame)?;
        Ok(frame)
    }

    fn close(&mut self) -> io::Result<()> {
        // Not-connected errors are fine: close must be idempotent enough to
        // run on an already-dead stream during failure teardown.
        match self.stream.shutdown(Shutdown::Both) {
            Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::TcpListener;

    use super::*;

    #[test]
    fn frames_round_trip_over_localhost() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut channel = FramedTcp::from_stream(stream);
            let frame = channel.recv().unwrap();
            channel.send(&frame).unwrap();
        });

        let mut client = FramedTcp::connect(addr).unwrap();
        client.send(b"ping across the loopback").unwrap();
        assert_eq!(client.recv().unwrap(), b"ping across the loopback");

        server.join().unwrap();
    }

    #[test]
    fn empty_frames_are_legal() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut channel = FramedTcp::from_stream(stream);
            assert_eq!(channel.recv().unwrap(), Vec::<u8>::new());
        });

        let mut client = FramedTcp::connect(addr).unwrap();
        client.send(b"").unwrap();
        server.join().unwrap();
    }

    #[test]
    fn oversized_announcement_is_rejected_before_allocation() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            // Claim a 4 GB frame without sending one
            stream.write_all(&u32::MAX.to_be_bytes()).unwrap();
        });

        let mut client = FramedTcp::connect(addr).unwrap();
        let err = client.recv().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        server.join().unwrap();
    }
}
