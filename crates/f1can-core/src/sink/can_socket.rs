use socketcan::{CanFrame, CanSocket, EmbeddedFrame, ExtendedId, Id, Socket, StandardId};
use tracing::debug;

use super::{FrameSink, SinkError};
use crate::protocols::can::OutputFrame;

/// Raw SocketCAN sink (Linux only). Works with `vcan` interfaces too.
pub struct SocketCanSink {
    socket: CanSocket,
}

impl SocketCanSink {
    pub fn open(interface: &str) -> Result<Self, SinkError> {
        let socket = CanSocket::open(interface)?;
        debug!(interface, "socketcan sink opened");
        Ok(Self { socket })
    }
}

fn frame_id(frame: &OutputFrame) -> Option<Id> {
    if frame.is_extended() {
        ExtendedId::new(frame.id()).map(Id::from)
    } else {
        u16::try_from(frame.id())
            .ok()
            .and_then(StandardId::new)
            .map(Id::from)
    }
}

impl FrameSink for SocketCanSink {
    fn send(&mut self, frame: &OutputFrame) -> Result<(), SinkError> {
        let invalid = || SinkError::InvalidFrame { id: frame.id() };
        let id = frame_id(frame).ok_or_else(invalid)?;
        let can_frame = CanFrame::new(id, frame.payload()).ok_or_else(invalid)?;
        self.socket.write_frame(&can_frame)?;
        Ok(())
    }
}
