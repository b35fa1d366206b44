use thiserror::Error;

/// Errors returned by the CAN frame encoder.
///
/// # Examples
/// ```
/// use f1can_core::protocols::can::{FrameError, encode_frame};
///
/// let err = encode_frame(0x400, 3, 1).unwrap_err();
/// assert_eq!(err, FrameError::UnsupportedLength { length: 3 });
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("unsupported frame length: {length} (expected 1, 2, 4 or 8)")]
    UnsupportedLength { length: u8 },
    #[error("invalid CAN identifier: {id:#x}")]
    InvalidIdentifier { id: u32 },
}
