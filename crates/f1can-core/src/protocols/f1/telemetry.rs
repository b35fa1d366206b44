use super::error::F1Error;
use super::header::{PacketHeader, PacketType};
use super::layout;
use super::reader::F1Reader;
use super::select::ParticipantPacket;

/// Per-car telemetry record (60 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CarTelemetry {
    /// Speed in km/h.
    pub speed: u16,
    /// 0.0 to 1.0.
    pub throttle: f32,
    /// -1.0 (full lock left) to 1.0 (full lock right).
    pub steer: f32,
    /// 0.0 to 1.0.
    pub brake: f32,
    /// 0 to 100.
    pub clutch: u8,
    /// 1-8, N=0, R=-1.
    pub gear: i8,
    pub engine_rpm: u16,
    pub drs: u8,
    pub rev_lights_percent: u8,
    pub rev_lights_bit_value: u16,
    /// Celsius, wheel order RL, RR, FL, FR.
    pub brakes_temperature: [u16; 4],
    pub tyres_surface_temperature: [u8; 4],
    pub tyres_inner_temperature: [u8; 4],
    /// Celsius.
    pub engine_temperature: u16,
    /// PSI.
    pub tyres_pressure: [f32; 4],
    pub surface_type: [u8; 4],
}

impl CarTelemetry {
    fn read(reader: &mut F1Reader<'_>) -> Result<Self, F1Error> {
        Ok(Self {
            speed: reader.read_u16()?,
            throttle: reader.read_f32()?,
            steer: reader.read_f32()?,
            brake: reader.read_f32()?,
            clutch: reader.read_u8()?,
            gear: reader.read_i8()?,
            engine_rpm: reader.read_u16()?,
            drs: reader.read_u8()?,
            rev_lights_percent: reader.read_u8()?,
            rev_lights_bit_value: reader.read_u16()?,
            brakes_temperature: reader.read_u16_array()?,
            tyres_surface_temperature: reader.read_u8_array()?,
            tyres_inner_temperature: reader.read_u8_array()?,
            engine_temperature: reader.read_u16()?,
            tyres_pressure: reader.read_f32_array()?,
            surface_type: reader.read_u8_array()?,
        })
    }
}

/// Player-only fields after the per-car array.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryTrailer {
    /// 255 when the MFD is closed.
    pub mfd_panel_index: u8,
    pub mfd_panel_index_secondary_player: u8,
    /// 0 when no gear is suggested.
    pub suggested_gear: i8,
}

/// Decoded car telemetry packet (id 6).
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPacket {
    pub header: PacketHeader,
    pub cars: [CarTelemetry; layout::MAX_PARTICIPANTS],
    pub trailer: TelemetryTrailer,
}

impl ParticipantPacket for TelemetryPacket {
    type Record = CarTelemetry;

    fn participants(&self) -> &[CarTelemetry; layout::MAX_PARTICIPANTS] {
        &self.cars
    }
}

/// Decode a car telemetry packet.
///
/// # Errors
/// `F1Error::TooShort` when the payload is shorter than
/// `TELEMETRY_PACKET_SIZE`, `F1Error::WrongPacketType` when the header tag is
/// not 6.
pub fn decode_telemetry(payload: &[u8]) -> Result<TelemetryPacket, F1Error> {
    let mut reader = F1Reader::bounded(
        payload,
        PacketType::CarTelemetry,
        layout::TELEMETRY_PACKET_SIZE,
    )?;
    let header = PacketHeader::read(&mut reader)?;
    header.expect(PacketType::CarTelemetry)?;

    let mut cars = [CarTelemetry::default(); layout::MAX_PARTICIPANTS];
    for (index, car) in cars.iter_mut().enumerate() {
        let offset = layout::participant_offset(index, layout::TELEMETRY_RECORD_SIZE);
        reader.seek(offset);
        *car = CarTelemetry::read(&mut reader)?;
        debug_assert_eq!(reader.position(), offset + layout::TELEMETRY_RECORD_SIZE);
    }

    reader.seek(layout::TELEMETRY_TRAILER_OFFSET);
    let trailer = TelemetryTrailer {
        mfd_panel_index: reader.read_u8()?,
        mfd_panel_index_secondary_player: reader.read_u8()?,
        suggested_gear: reader.read_i8()?,
    };
    debug_assert_eq!(reader.position(), layout::TELEMETRY_PACKET_SIZE);

    Ok(TelemetryPacket {
        header,
        cars,
        trailer,
    })
}
