/// Largest classic CAN payload.
pub const MAX_PAYLOAD: usize = 8;
/// Payload widths a single scalar can be packed into.
pub const SUPPORTED_LENGTHS: [u8; 4] = [1, 2, 4, 8];

/// Highest 11-bit standard identifier.
pub const MAX_STANDARD_ID: u32 = 0x7FF;
/// Highest 29-bit extended identifier.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;
