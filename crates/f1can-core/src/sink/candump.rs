use std::io::Write;

use super::{FrameSink, SinkError};
use crate::protocols::can::OutputFrame;

/// Writes frames as `candump -L`-style lines, `<interface> <id>#<data>`.
///
/// The output can be fed back to `canplayer` or just read.
pub struct CandumpSink<W: Write> {
    out: W,
    interface: String,
}

impl<W: Write> CandumpSink<W> {
    pub fn new(out: W, interface: impl Into<String>) -> Self {
        Self {
            out,
            interface: interface.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for CandumpSink<W> {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        writeln!(self.out, "{} {}", self.interface, frame)?;
        self.out.flush()?;
        Ok(())
    }
}
