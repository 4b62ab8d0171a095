//! Length-framed blocking byte channels the protocol drivers run over.
//!
//! Every payload travels as a 4-byte big-endian length followed by that many
//! bytes. Reads block until the full frame arrived; an endpoint closing
//! mid-frame surfaces as an I/O error.

use std::io::{self, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};

use tracing::trace;

use crate::error::SigmaError;

/// A blocking message channel carrying self-delimiting frames.
pub trait Channel {
    fn write_with_size(&mut self, payload: &[u8]) -> Result<(), SigmaError>;

    fn read_with_size(&mut self) -> Result<Vec<u8>, SigmaError>;
}

/// Frames an arbitrary byte stream, e.g. a [`std::net::TcpStream`].
pub struct FramedChannel<T> {
    stream: T,
}

impl<T: Read + Write> FramedChannel<T> {
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> T {
        self.stream
    }
}

impl<T: Read + Write> Channel for FramedChannel<T> {
    fn write_with_size(&mut self, payload: &[u8]) -> Result<(), SigmaError> {
        let len = u32::try_from(payload.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame too large"))?;
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(payload)?;
        self.stream.flush()?;
        trace!(bytes = payload.len(), "frame written");
        Ok(())
    }

    fn read_with_size(&mut self) -> Result<Vec<u8>, SigmaError> {
        let mut len_bytes = [0u8; 4];
        self.stream.read_exact(&mut len_bytes)?;
        let len = u32::from_be_bytes(len_bytes) as usize;
        let mut payload = vec![0u8; len];
        self.stream.read_exact(&mut payload)?;
        trace!(bytes = len, "frame read");
        Ok(payload)
    }
}

/// In-process channel endpoint. [`MemoryChannel::pair`] yields two connected
/// endpoints; reads block until the peer writes, and fail once the peer is
/// dropped.
pub struct MemoryChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl MemoryChannel {
    pub fn pair() -> (MemoryChannel, MemoryChannel) {
        let (left_tx, left_rx) = mpsc::channel();
        let (right_tx, right_rx) = mpsc::channel();
        (
            MemoryChannel {
                tx: left_tx,
                rx: right_rx,
            },
            MemoryChannel {
                tx: right_tx,
                rx: left_rx,
            },
        )
    }
}

impl Channel for MemoryChannel {
    fn write_with_size(&mut self, payload: &[u8]) -> Result<(), SigmaError> {
        self.tx
            .send(payload.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer endpoint dropped"))?;
        trace!(bytes = payload.len(), "frame queued");
        Ok(())
    }

    fn read_with_size(&mut self) -> Result<Vec<u8>, SigmaError> {
        let payload = self.rx.recv().map_err(|_| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "peer endpoint dropped")
        })?;
        trace!(bytes = payload.len(), "frame dequeued");
        Ok(payload)
    }
}
