use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::F1Error;
use super::layout;
use super::reader::F1Reader;

/// Packet type tags carried at `PACKET_ID_OFFSET` in every F1 22 datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketType {
    Motion,
    Session,
    LapData,
    Event,
    Participants,
    CarSetups,
    CarTelemetry,
    CarStatus,
    FinalClassification,
    LobbyInfo,
    CarDamage,
    SessionHistory,
}

impl PacketType {
    pub fn from_id(id: u8) -> Option<Self> {
        let packet = match id {
            0 => Self::Motion,
            1 => Self::Session,
            2 => Self::LapData,
            3 => Self::Event,
            4 => Self::Participants,
            5 => Self::CarSetups,
            6 => Self::CarTelemetry,
            7 => Self::CarStatus,
            8 => Self::FinalClassification,
            9 => Self::LobbyInfo,
            10 => Self::CarDamage,
            11 => Self::SessionHistory,
            _ => return None,
        };
        Some(packet)
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Motion => 0,
            Self::Session => 1,
            Self::LapData => 2,
            Self::Event => 3,
            Self::Participants => 4,
            Self::CarSetups => 5,
            Self::CarTelemetry => 6,
            Self::CarStatus => 7,
            Self::FinalClassification => 8,
            Self::LobbyInfo => 9,
            Self::CarDamage => 10,
            Self::SessionHistory => 11,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Motion => "motion",
            Self::Session => "session",
            Self::LapData => "lap data",
            Self::Event => "event",
            Self::Participants => "participants",
            Self::CarSetups => "car setups",
            Self::CarTelemetry => "car telemetry",
            Self::CarStatus => "car status",
            Self::FinalClassification => "final classification",
            Self::LobbyInfo => "lobby info",
            Self::CarDamage => "car damage",
            Self::SessionHistory => "session history",
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of the header classifier: the raw type tag and the local
/// participant index, both unvalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub packet_id: u8,
    pub player_car_index: u8,
}

impl Classification {
    pub fn packet_type(&self) -> Option<PacketType> {
        PacketType::from_id(self.packet_id)
    }
}

/// Read the type tag and player index from the common header.
///
/// # Examples
/// ```
/// use f1can_core::protocols::f1::classify;
///
/// let mut datagram = [0u8; 24];
/// datagram[5] = 6;
/// datagram[22] = 3;
/// let class = classify(&datagram)?;
/// assert_eq!(class.packet_id, 6);
/// assert_eq!(class.player_car_index, 3);
/// # Ok::<(), f1can_core::protocols::f1::F1Error>(())
/// ```
///
/// # Errors
/// Returns `F1Error::TruncatedBuffer` when the datagram is shorter than the
/// header.
pub fn classify(payload: &[u8]) -> Result<Classification, F1Error> {
    let mut reader = F1Reader::new(payload);
    reader.require_len(layout::HEADER_SIZE)?;
    reader.seek(layout::PACKET_ID_OFFSET);
    let packet_id = reader.read_u8()?;
    reader.seek(layout::PLAYER_CAR_INDEX_OFFSET);
    let player_car_index = reader.read_u8()?;
    Ok(Classification {
        packet_id,
        player_car_index,
    })
}

/// Common 24-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PacketHeader {
    pub packet_format: u16,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_id: u8,
    pub session_uid: u64,
    pub session_time: f32,
    pub frame_identifier: u32,
    pub player_car_index: u8,
    pub secondary_player_car_index: u8,
}

impl PacketHeader {
    /// Decode the full header from the start of `payload`.
    pub fn decode(payload: &[u8]) -> Result<Self, F1Error> {
        let mut reader = F1Reader::new(payload);
        reader.require_len(layout::HEADER_SIZE)?;
        Self::read(&mut reader)
    }

    pub(crate) fn read(reader: &mut F1Reader<'_>) -> Result<Self, F1Error> {
        reader.seek(0);
        let header = Self {
            packet_format: reader.read_u16()?,
            game_major_version: reader.read_u8()?,
            game_minor_version: reader.read_u8()?,
            packet_version: reader.read_u8()?,
            packet_id: reader.read_u8()?,
            session_uid: reader.read_u64()?,
            session_time: reader.read_f32()?,
            frame_identifier: reader.read_u32()?,
            player_car_index: reader.read_u8()?,
            secondary_player_car_index: reader.read_u8()?,
        };
        debug_assert_eq!(reader.position(), layout::HEADER_SIZE);
        Ok(header)
    }

    pub(crate) fn expect(&self, expected: PacketType) -> Result<(), F1Error> {
        if self.packet_id != expected.id() {
            return Err(F1Error::WrongPacketType {
                expected,
                actual: self.packet_id,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PacketHeader, PacketType, classify};
    use crate::protocols::f1::error::F1Error;
    use crate::protocols::f1::layout;

    fn header_bytes() -> [u8; layout::HEADER_SIZE] {
        let mut payload = [0u8; layout::HEADER_SIZE];
        payload[layout::PACKET_FORMAT_RANGE].copy_from_slice(&2022u16.to_le_bytes());
        payload[layout::GAME_MAJOR_VERSION_OFFSET] = 1;
        payload[layout::GAME_MINOR_VERSION_OFFSET] = 19;
        payload[layout::PACKET_VERSION_OFFSET] = 1;
        payload[layout::PACKET_ID_OFFSET] = 7;
        payload[layout::SESSION_UID_RANGE].copy_from_slice(&0xdead_beef_u64.to_le_bytes());
        payload[layout::SESSION_TIME_RANGE].copy_from_slice(&12.5f32.to_le_bytes());
        payload[layout::FRAME_IDENTIFIER_RANGE].copy_from_slice(&42u32.to_le_bytes());
        payload[layout::PLAYER_CAR_INDEX_OFFSET] = 19;
        payload[layout::SECONDARY_PLAYER_CAR_INDEX_OFFSET] = 255;
        payload
    }

    #[test]
    fn classify_reads_tag_and_player_index() {
        let class = classify(&header_bytes()).unwrap();
        assert_eq!(class.packet_id, 7);
        assert_eq!(class.player_car_index, 19);
        assert_eq!(class.packet_type(), Some(PacketType::CarStatus));
    }

    #[test]
    fn classify_passes_unknown_tags_through() {
        let mut payload = header_bytes();
        payload[layout::PACKET_ID_OFFSET] = 99;
        let class = classify(&payload).unwrap();
        assert_eq!(class.packet_id, 99);
        assert_eq!(class.packet_type(), None);
    }

    #[test]
    fn classify_short_buffer() {
        let err = classify(&[0u8; layout::HEADER_SIZE - 1]).unwrap_err();
        assert_eq!(
            err,
            F1Error::TruncatedBuffer {
                needed: layout::HEADER_SIZE,
                actual: layout::HEADER_SIZE - 1
            }
        );
    }

    #[test]
    fn decode_full_header() {
        let header = PacketHeader::decode(&header_bytes()).unwrap();
        assert_eq!(header.packet_format, 2022);
        assert_eq!(header.game_minor_version, 19);
        assert_eq!(header.session_uid, 0xdead_beef);
        assert_eq!(header.session_time, 12.5);
        assert_eq!(header.frame_identifier, 42);
        assert_eq!(header.secondary_player_car_index, 255);
    }

    #[test]
    fn packet_type_ids_round_trip() {
        for id in 0..=11u8 {
            let packet = PacketType::from_id(id).expect("known id");
            assert_eq!(packet.id(), id);
        }
        assert_eq!(PacketType::from_id(12), None);
    }
}
