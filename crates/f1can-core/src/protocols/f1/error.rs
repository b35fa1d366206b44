use thiserror::Error;

use super::header::PacketType;

/// Errors returned by F1 header classification, packet decoding and
/// participant selection.
///
/// # Examples
/// ```
/// use f1can_core::protocols::f1::{F1Error, PacketType};
///
/// let err = F1Error::TooShort {
///     packet: PacketType::CarTelemetry,
///     needed: 1347,
///     actual: 10,
/// };
/// assert!(err.to_string().contains("too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum F1Error {
    #[error("truncated buffer: need {needed} bytes, got {actual}")]
    TruncatedBuffer { needed: usize, actual: usize },
    #[error("{packet} packet too short: need {needed} bytes, got {actual}")]
    TooShort {
        packet: PacketType,
        needed: usize,
        actual: usize,
    },
    #[error("wrong packet type: expected {expected} (id {}), got id {actual}", expected.id())]
    WrongPacketType { expected: PacketType, actual: u8 },
    #[error("participant index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },
}
