//! Datagram sources feeding the dispatcher.
//!
//! A source hands out one whole datagram per call and owns the underlying
//! socket or file. `Ok(None)` ends the stream (end of capture, or shutdown
//! requested on a live socket).

mod capture;
mod udp;

pub use capture::{CaptureDatagramSource, CaptureStats};
pub use udp::{DEFAULT_PORT, UdpDatagramSource};

use thiserror::Error;

pub trait DatagramSource {
    /// Block until the next datagram is available.
    ///
    /// The returned slice is only valid until the next call.
    fn next_datagram(&mut self) -> Result<Option<&[u8]>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("capture parse error: {0}")]
    Capture(String),
}

impl From<capture::error::CaptureError> for SourceError {
    fn from(value: capture::error::CaptureError) -> Self {
        match value {
            capture::error::CaptureError::Io(err) => SourceError::Io(err),
            capture::error::CaptureError::Pcap { context, message } => {
                SourceError::Capture(format!("{context}: {message}"))
            }
        }
    }
}
