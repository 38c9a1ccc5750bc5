//! In-memory duplex channel.
//!
//! A [`RawChannel`] backed by a pair of in-process queues. Used by the test
//! suites to run both ends of a handshake without sockets, and by anything
//! that wants to drive a secured channel loopback-style. The close flag is
//! observable from outside through a [`CloseWitness`], which is how tests
//! verify the "raw channel closed before the failure surfaces" contract.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{Receiver, Sender, channel},
    },
};

use crate::channel::RawChannel;

/// Observer for an endpoint's close flag.
///
/// Remains valid after the channel itself has been consumed by a transform
/// chain or moved into another thread.
#[derive(Debug, Clone)]
pub struct CloseWitness {
    closed: Arc<AtomicBool>,
}

impl CloseWitness {
    /// Whether `close()` has been called on the observed endpoint.
    #[must_use]
    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// One endpoint of an in-memory duplex byte channel.
///
/// Frames are delivered whole, in order, exactly once - the same contract as
/// the TCP transport, minus the network.
#[derive(Debug)]
pub struct MemoryChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    closed: Arc<AtomicBool>,
}

impl MemoryChannel {
    /// Create a connected pair of endpoints.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let (a_tx, b_rx) = channel();
        let (b_tx, a_rx) = channel();
        let a = Self { tx: a_tx, rx: a_rx, closed: Arc::new(AtomicBool::new(false)) };
        let b = Self { tx: b_tx, rx: b_rx, closed: Arc::new(AtomicBool::new(false)) };
        (a, b)
    }

    /// Witness for this endpoint's close flag.
    #[must_use]
    pub fn close_witness(&self) -> CloseWitness {
        CloseWitness { closed: Arc::clone(&self.closed) }
    }
}

impl RawChannel for MemoryChannel {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        self.tx
            .send(frame.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer dropped"))
    }

    fn recv(&mut self) -> io::Result<Vec<u8>> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "channel closed"));
        }
        self.rx
            .recv()
            .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "peer dropped"))
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
