use thiserror::Error;

use super::DispatchState;
use crate::mapping::MappingError;
use crate::protocols::can::FrameError;
use crate::protocols::f1::F1Error;
use crate::source::SourceError;

/// Why one datagram produced no frames. Always local to that datagram.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    #[error("classify: {0}")]
    Classify(F1Error),
    #[error("decode: {0}")]
    Decode(F1Error),
    #[error("select: {0}")]
    Select(F1Error),
    #[error("map: {0}")]
    Map(MappingError),
    #[error("encode: {0}")]
    Encode(FrameError),
}

impl DispatchError {
    /// Last state reached before the failure.
    pub fn stage(&self) -> DispatchState {
        match self {
            Self::Classify(_) => DispatchState::AwaitingDatagram,
            Self::Decode(_) => DispatchState::Classified,
            Self::Select(_) => DispatchState::Decoded,
            Self::Map(_) => DispatchState::Selected,
            Self::Encode(_) => DispatchState::Mapped,
        }
    }

    /// Stable label used as the failure counter key.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Classify(err) | Self::Decode(err) | Self::Select(err) => match err {
                F1Error::TruncatedBuffer { .. } => "truncated_buffer",
                F1Error::TooShort { .. } => "too_short",
                F1Error::WrongPacketType { .. } => "wrong_packet_type",
                F1Error::IndexOutOfRange { .. } => "index_out_of_range",
            },
            Self::Map(MappingError::Overflow { .. }) => "mapping_overflow",
            Self::Encode(FrameError::UnsupportedLength { .. }) => "unsupported_length",
            Self::Encode(FrameError::InvalidIdentifier { .. }) => "invalid_identifier",
        }
    }
}

/// Errors that stop [`Dispatcher::run`](super::Dispatcher::run).
#[derive(Debug, Error)]
pub enum RunError {
    #[error("datagram source failed: {0}")]
    Source(#[from] SourceError),
}
