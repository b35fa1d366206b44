//! Byte offsets and sizes of the F1 22 UDP packets.
//!
//! Every packet starts with the 24-byte header, followed by one fixed-size
//! record per participant slot and an optional player-only trailer. All
//! multi-byte fields are little-endian. Any change here shifts every
//! following offset and breaks wire compatibility.

use std::ops::Range;

pub const HEADER_SIZE: usize = 24;

pub const PACKET_FORMAT_RANGE: Range<usize> = 0..2;
pub const GAME_MAJOR_VERSION_OFFSET: usize = 2;
pub const GAME_MINOR_VERSION_OFFSET: usize = 3;
pub const PACKET_VERSION_OFFSET: usize = 4;
pub const PACKET_ID_OFFSET: usize = 5;
pub const SESSION_UID_RANGE: Range<usize> = 6..14;
pub const SESSION_TIME_RANGE: Range<usize> = 14..18;
pub const FRAME_IDENTIFIER_RANGE: Range<usize> = 18..22;
pub const PLAYER_CAR_INDEX_OFFSET: usize = 22;
pub const SECONDARY_PLAYER_CAR_INDEX_OFFSET: usize = 23;

/// Number of participant slots carried by every per-car array.
pub const MAX_PARTICIPANTS: usize = 22;

pub const TELEMETRY_RECORD_SIZE: usize = 60;
pub const TELEMETRY_TRAILER_SIZE: usize = 3;
pub const TELEMETRY_TRAILER_OFFSET: usize = HEADER_SIZE + MAX_PARTICIPANTS * TELEMETRY_RECORD_SIZE;
pub const TELEMETRY_PACKET_SIZE: usize = TELEMETRY_TRAILER_OFFSET + TELEMETRY_TRAILER_SIZE;

pub const STATUS_RECORD_SIZE: usize = 47;
pub const STATUS_PACKET_SIZE: usize = HEADER_SIZE + MAX_PARTICIPANTS * STATUS_RECORD_SIZE;

pub const MOTION_RECORD_SIZE: usize = 60;
/// Five wheel arrays of `[f32; 4]` plus ten `f32` scalars.
pub const MOTION_TRAILER_SIZE: usize = 5 * 16 + 10 * 4;
pub const MOTION_TRAILER_OFFSET: usize = HEADER_SIZE + MAX_PARTICIPANTS * MOTION_RECORD_SIZE;
pub const MOTION_PACKET_SIZE: usize = MOTION_TRAILER_OFFSET + MOTION_TRAILER_SIZE;

const _: () = assert!(TELEMETRY_PACKET_SIZE == 1347);
const _: () = assert!(STATUS_PACKET_SIZE == 1058);
const _: () = assert!(MOTION_PACKET_SIZE == 1464);

/// Upper bound on a single datagram accepted from the game.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Offset of participant `index` in an array of `record_size` records.
pub const fn participant_offset(index: usize, record_size: usize) -> usize {
    HEADER_SIZE + index * record_size
}
