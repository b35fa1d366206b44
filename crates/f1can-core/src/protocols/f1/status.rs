use super::error::F1Error;
use super::header::{PacketHeader, PacketType};
use super::layout;
use super::reader::F1Reader;
use super::select::ParticipantPacket;

/// Per-car status record (47 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarStatus {
    /// 0 = off, 1 = medium, 2 = full.
    pub traction_control: u8,
    pub anti_lock_brakes: u8,
    /// 0 = lean, 1 = standard, 2 = rich, 3 = max.
    pub fuel_mix: u8,
    /// Percentage.
    pub front_brake_bias: u8,
    pub pit_limiter_status: u8,
    /// Kilograms.
    pub fuel_in_tank: f32,
    /// Kilograms.
    pub fuel_capacity: f32,
    /// Laps, as shown on the MFD.
    pub fuel_remaining_laps: f32,
    pub max_rpm: u16,
    pub idle_rpm: u16,
    pub max_gears: u8,
    pub drs_allowed: u8,
    /// Metres until DRS becomes available, 0 when not available.
    pub drs_activation_distance: u16,
    pub actual_tyre_compound: u8,
    pub visual_tyre_compound: u8,
    pub tyres_age_laps: u8,
    /// -1 = unknown, 0 = none, 1 = green, 2 = blue, 3 = yellow, 4 = red.
    pub vehicle_fia_flags: i8,
    /// Joules.
    pub ers_store_energy: f32,
    pub ers_deploy_mode: u8,
    pub ers_harvested_this_lap_mguk: f32,
    pub ers_harvested_this_lap_mguh: f32,
    pub ers_deployed_this_lap: f32,
    pub network_paused: u8,
}

impl CarStatus {
    fn read(reader: &mut F1Reader<'_>) -> Result<Self, F1Error> {
        Ok(Self {
            traction_control: reader.read_u8()?,
            anti_lock_brakes: reader.read_u8()?,
            fuel_mix: reader.read_u8()?,
            front_brake_bias: reader.read_u8()?,
            pit_limiter_status: reader.read_u8()?,
            fuel_in_tank: reader.read_f32()?,
            fuel_capacity: reader.read_f32()?,
            fuel_remaining_laps: reader.read_f32()?,
            max_rpm: reader.read_u16()?,
            idle_rpm: reader.read_u16()?,
            max_gears: reader.read_u8()?,
            drs_allowed: reader.read_u8()?,
            drs_activation_distance: reader.read_u16()?,
            actual_tyre_compound: reader.read_u8()?,
            visual_tyre_compound: reader.read_u8()?,
            tyres_age_laps: reader.read_u8()?,
            vehicle_fia_flags: reader.read_i8()?,
            ers_store_energy: reader.read_f32()?,
            ers_deploy_mode: reader.read_u8()?,
            ers_harvested_this_lap_mguk: reader.read_f32()?,
            ers_harvested_this_lap_mguh: reader.read_f32()?,
            ers_deployed_this_lap: reader.read_f32()?,
            network_paused: reader.read_u8()?,
        })
    }
}

/// Decoded car status packet (id 7). The status layout has no trailer.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusPacket {
    pub header: PacketHeader,
    pub cars: [CarStatus; layout::MAX_PARTICIPANTS],
}

impl ParticipantPacket for StatusPacket {
    type Record = CarStatus;

    fn participants(&self) -> &[CarStatus; layout::MAX_PARTICIPANTS] {
        &self.cars
    }
}

/// Decode a car status packet.
///
/// # Errors
/// `F1Error::TooShort` below `STATUS_PACKET_SIZE` bytes,
/// `F1Error::WrongPacketType` when the header tag is not 7.
pub fn decode_status(payload: &[u8]) -> Result<StatusPacket, F1Error> {
    let mut reader =
        F1Reader::bounded(payload, PacketType::CarStatus, layout::STATUS_PACKET_SIZE)?;
    let header = PacketHeader::read(&mut reader)?;
    header.expect(PacketType::CarStatus)?;

    let mut cars = [CarStatus::default(); layout::MAX_PARTICIPANTS];
    for (index, car) in cars.iter_mut().enumerate() {
        let offset = layout::participant_offset(index, layout::STATUS_RECORD_SIZE);
        reader.seek(offset);
        *car = CarStatus::read(&mut reader)?;
        debug_assert_eq!(reader.position(), offset + layout::STATUS_RECORD_SIZE);
    }
    debug_assert_eq!(reader.position(), layout::STATUS_PACKET_SIZE);

    Ok(StatusPacket { header, cars })
}

#[cfg(test)]
mod tests {
    use super::decode_status;
    use crate::protocols::f1::error::F1Error;
    use crate::protocols::f1::header::PacketType;
    use crate::protocols::f1::layout;
    use crate::synth::{StatusDatagram, status_record};

    #[test]
    fn decode_valid_status() {
        let mut car = status_record();
        car.fuel_in_tank = 42.25;
        car.vehicle_fia_flags = -1;
        car.network_paused = 1;
        let mut datagram = StatusDatagram::new(21);
        datagram.cars[21] = car;
        let bytes = datagram.encode();
        assert_eq!(bytes.len(), layout::STATUS_PACKET_SIZE);

        let packet = decode_status(&bytes).unwrap();
        assert_eq!(packet.header.player_car_index, 21);
        assert_eq!(packet.cars[21], car);
        assert_eq!(packet.cars[20].fuel_in_tank, 0.0);
    }

    #[test]
    fn decode_short_payload() {
        let err = decode_status(&[0u8; 100]).unwrap_err();
        assert!(matches!(
            err,
            F1Error::TooShort {
                packet: PacketType::CarStatus,
                needed: 1058,
                actual: 100
            }
        ));
    }

    #[test]
    fn decode_one_byte_short_of_layout() {
        let bytes = StatusDatagram::new(0).encode();
        let err = decode_status(&bytes[..layout::STATUS_PACKET_SIZE - 1]).unwrap_err();
        assert!(matches!(err, F1Error::TooShort { actual: 1057, .. }));
    }

    #[test]
    fn decode_rejects_telemetry_tag() {
        let mut bytes = StatusDatagram::new(0).encode();
        bytes[layout::PACKET_ID_OFFSET] = PacketType::CarTelemetry.id();
        let err = decode_status(&bytes).unwrap_err();
        assert!(matches!(err, F1Error::WrongPacketType { actual: 6, .. }));
    }
}
