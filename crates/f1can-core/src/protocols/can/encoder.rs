use std::fmt;

use super::error::FrameError;
use super::layout;

/// One outbound CAN frame carrying a single big-endian scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFrame {
    id: u32,
    len: u8,
    data: [u8; layout::MAX_PAYLOAD],
}

impl OutputFrame {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn len(&self) -> usize {
        usize::from(self.len)
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` when the identifier needs the 29-bit extended format.
    pub fn is_extended(&self) -> bool {
        self.id > layout::MAX_STANDARD_ID
    }

    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len()]
    }
}

/// candump-style `ID#HEX` notation, e.g. `400#B4`.
impl fmt::Display for OutputFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_extended() {
            write!(f, "{:08X}#", self.id)?;
        } else {
            write!(f, "{:03X}#", self.id)?;
        }
        for byte in self.payload() {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Pack `value` big-endian into a `length`-byte frame payload.
///
/// Values wider than `length` are truncated to their low-order bytes; this is
/// the only place where the outbound byte order is applied.
///
/// # Examples
/// ```
/// use f1can_core::protocols::can::encode_frame;
///
/// let frame = encode_frame(0x401, 2, 0x1234)?;
/// assert_eq!(frame.payload(), &[0x12, 0x34]);
/// let frame = encode_frame(0x401, 1, 0x1234)?;
/// assert_eq!(frame.payload(), &[0x34]);
/// # Ok::<(), f1can_core::protocols::can::FrameError>(())
/// ```
///
/// # Errors
/// `FrameError::UnsupportedLength` unless `length` is 1, 2, 4 or 8;
/// `FrameError::InvalidIdentifier` above the 29-bit identifier range.
pub fn encode_frame(id: u32, length: u8, value: u64) -> Result<OutputFrame, FrameError> {
    if !layout::SUPPORTED_LENGTHS.contains(&length) {
        return Err(FrameError::UnsupportedLength { length });
    }
    if id > layout::MAX_EXTENDED_ID {
        return Err(FrameError::InvalidIdentifier { id });
    }

    let len = usize::from(length);
    let bytes = value.to_be_bytes();
    let mut data = [0u8; layout::MAX_PAYLOAD];
    data[..len].copy_from_slice(&bytes[bytes.len() - len..]);

    Ok(OutputFrame {
        id,
        len: length,
        data,
    })
}
