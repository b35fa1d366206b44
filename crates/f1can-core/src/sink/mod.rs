//! Frame sinks: where encoded CAN frames go.
//!
//! The dispatcher hands frames to a sink one at a time, in profile order.
//! A sink never reorders or coalesces frames.

mod candump;
#[cfg(target_os = "linux")]
mod can_socket;

pub use candump::CandumpSink;
#[cfg(target_os = "linux")]
pub use can_socket::SocketCanSink;

use thiserror::Error;

use crate::protocols::can::OutputFrame;

pub trait FrameSink {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError>;
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("frame {id:#x} rejected by the bus driver")]
    InvalidFrame { id: u32 },
}

/// Keeps every frame in memory.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub frames: Vec<OutputFrame>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameSink for CollectingSink {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        self.frames.push(*frame);
        Ok(())
    }
}

impl<K: FrameSink + ?Sized> FrameSink for &mut K {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        (**self).send(frame)
    }
}

impl<K: FrameSink + ?Sized> FrameSink for Box<K> {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        (**self).send(frame)
    }
}
