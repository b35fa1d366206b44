use super::error::F1Error;
use super::header::{PacketHeader, PacketType};
use super::layout;
use super::reader::F1Reader;
use super::select::ParticipantPacket;

/// Per-car motion record (60 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarMotion {
    pub world_position: [f32; 3],
    pub world_velocity: [f32; 3],
    /// Normalised to `i16` (divide by 32767).
    pub world_forward_dir: [i16; 3],
    pub world_right_dir: [i16; 3],
    pub g_force_lateral: f32,
    pub g_force_longitudinal: f32,
    pub g_force_vertical: f32,
    /// Radians.
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl CarMotion {
    fn read(reader: &mut F1Reader<'_>) -> Result<Self, F1Error> {
        Ok(Self {
            world_position: reader.read_f32_array()?,
            world_velocity: reader.read_f32_array()?,
            world_forward_dir: read_i16_triplet(reader)?,
            world_right_dir: read_i16_triplet(reader)?,
            g_force_lateral: reader.read_f32()?,
            g_force_longitudinal: reader.read_f32()?,
            g_force_vertical: reader.read_f32()?,
            yaw: reader.read_f32()?,
            pitch: reader.read_f32()?,
            roll: reader.read_f32()?,
        })
    }
}

fn read_i16_triplet(reader: &mut F1Reader<'_>) -> Result<[i16; 3], F1Error> {
    Ok([reader.read_i16()?, reader.read_i16()?, reader.read_i16()?])
}

/// Player-only fields after the per-car array. Wheel arrays are ordered
/// RL, RR, FL, FR.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionTrailer {
    pub suspension_position: [f32; 4],
    pub suspension_velocity: [f32; 4],
    pub suspension_acceleration: [f32; 4],
    pub wheel_speed: [f32; 4],
    pub wheel_slip: [f32; 4],
    pub local_velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub angular_acceleration: [f32; 3],
    /// Radians.
    pub front_wheels_angle: f32,
}

impl MotionTrailer {
    fn read(reader: &mut F1Reader<'_>) -> Result<Self, F1Error> {
        Ok(Self {
            suspension_position: reader.read_f32_array()?,
            suspension_velocity: reader.read_f32_array()?,
            suspension_acceleration: reader.read_f32_array()?,
            wheel_speed: reader.read_f32_array()?,
            wheel_slip: reader.read_f32_array()?,
            local_velocity: reader.read_f32_array()?,
            angular_velocity: reader.read_f32_array()?,
            angular_acceleration: reader.read_f32_array()?,
            front_wheels_angle: reader.read_f32()?,
        })
    }
}

/// Decoded motion packet (id 0).
#[derive(Debug, Clone, PartialEq)]
pub struct MotionPacket {
    pub header: PacketHeader,
    pub cars: [CarMotion; layout::MAX_PARTICIPANTS],
    pub trailer: MotionTrailer,
}

impl ParticipantPacket for MotionPacket {
    type Record = CarMotion;

    fn participants(&self) -> &[CarMotion; layout::MAX_PARTICIPANTS] {
        &self.cars
    }
}

/// Decode a motion packet.
///
/// # Errors
/// `F1Error::TooShort` below `MOTION_PACKET_SIZE` bytes,
/// `F1Error::WrongPacketType` when the header tag is not 0.
pub fn decode_motion(payload: &[u8]) -> Result<MotionPacket, F1Error> {
    let mut reader = F1Reader::bounded(payload, PacketType::Motion, layout::MOTION_PACKET_SIZE)?;
    let header = PacketHeader::read(&mut reader)?;
    header.expect(PacketType::Motion)?;

    let mut cars = [CarMotion::default(); layout::MAX_PARTICIPANTS];
    for (index, car) in cars.iter_mut().enumerate() {
        let offset = layout::participant_offset(index, layout::MOTION_RECORD_SIZE);
        reader.seek(offset);
        *car = CarMotion::read(&mut reader)?;
        debug_assert_eq!(reader.position(), offset + layout::MOTION_RECORD_SIZE);
    }

    reader.seek(layout::MOTION_TRAILER_OFFSET);
    let trailer = MotionTrailer::read(&mut reader)?;
    debug_assert_eq!(reader.position(), layout::MOTION_PACKET_SIZE);

    Ok(MotionPacket {
        header,
        cars,
        trailer,
    })
}

#[cfg(test)]
mod tests {
    use super::decode_motion;
    use crate::protocols::f1::error::F1Error;
    use crate::protocols::f1::layout;
    use crate::synth::MotionDatagram;

    #[test]
    fn decode_valid_motion() {
        let mut datagram = MotionDatagram::new(2);
        datagram.cars[2].g_force_lateral = -3.5;
        datagram.cars[2].world_forward_dir = [32767, 0, -32767];
        datagram.cars[2].roll = 0.01;
        datagram.trailer.wheel_speed = [80.0, 80.5, 81.0, 81.5];
        datagram.trailer.front_wheels_angle = 0.2;
        let bytes = datagram.encode();
        assert_eq!(bytes.len(), layout::MOTION_PACKET_SIZE);

        let packet = decode_motion(&bytes).unwrap();
        assert_eq!(packet.cars[2], datagram.cars[2]);
        assert_eq!(packet.trailer, datagram.trailer);
    }

    #[test]
    fn decode_short_payload_reports_motion_size() {
        let err = decode_motion(&[0u8; layout::HEADER_SIZE]).unwrap_err();
        assert!(matches!(err, F1Error::TooShort { needed: 1464, .. }));
    }

    #[test]
    fn decode_one_byte_short_of_layout() {
        let bytes = MotionDatagram::new(0).encode();
        let err = decode_motion(&bytes[..layout::MOTION_PACKET_SIZE - 1]).unwrap_err();
        assert!(matches!(err, F1Error::TooShort { actual: 1463, .. }));
    }

    #[test]
    fn decode_wrong_packet_type() {
        let mut bytes = MotionDatagram::new(0).encode();
        bytes[layout::PACKET_ID_OFFSET] = 3;
        assert!(matches!(
            decode_motion(&bytes),
            Err(F1Error::WrongPacketType { actual: 3, .. })
        ));
    }
}
