//! Synthetic F1 22 datagrams and captures.
//!
//! Used by the tests and by the `synth_capture` binary to produce inputs
//! byte-compatible with what the game sends, without a running game.

use etherparse::PacketBuilder;
use etherparse::err::packet::BuildWriteError;

use crate::protocols::f1::layout;
use crate::protocols::f1::{
    CarMotion, CarStatus, CarTelemetry, MotionTrailer, PacketHeader, PacketType, TelemetryTrailer,
};

const PACKET_FORMAT: u16 = 2022;
const GAME_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x01];
const BRIDGE_MAC: [u8; 6] = [0x02, 0x00, 0x00, 0x00, 0x00, 0x02];
const IPV4_TTL: u8 = 64;

const LINKTYPE_ETHERNET: u16 = 1;
const SNAPLEN: u32 = 65_535;
const SECTION_HEADER_BLOCK: u32 = 0x0A0D_0D0A;
const INTERFACE_DESCRIPTION_BLOCK: u32 = 1;
const ENHANCED_PACKET_BLOCK: u32 = 6;
const BYTE_ORDER_MAGIC: u32 = 0x1A2B_3C4D;

/// Little-endian writer mirroring the decoder's reader.
struct LeWriter {
    buf: Vec<u8>,
}

impl LeWriter {
    fn with_size(size: usize) -> Self {
        Self {
            buf: vec![0u8; size],
        }
    }

    fn at(&mut self, offset: usize) -> Cursor<'_> {
        Cursor {
            buf: &mut self.buf,
            pos: offset,
        }
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }
}

struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn put(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        self
    }

    fn u8(&mut self, value: u8) -> &mut Self {
        self.put(&[value])
    }

    fn i8(&mut self, value: i8) -> &mut Self {
        self.put(&value.to_le_bytes())
    }

    fn u16(&mut self, value: u16) -> &mut Self {
        self.put(&value.to_le_bytes())
    }

    fn i16(&mut self, value: i16) -> &mut Self {
        self.put(&value.to_le_bytes())
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.put(&value.to_le_bytes())
    }

    fn u64(&mut self, value: u64) -> &mut Self {
        self.put(&value.to_le_bytes())
    }

    fn f32(&mut self, value: f32) -> &mut Self {
        self.put(&value.to_le_bytes())
    }

    fn u16s(&mut self, values: &[u16]) -> &mut Self {
        for value in values {
            self.u16(*value);
        }
        self
    }

    fn i16s(&mut self, values: &[i16]) -> &mut Self {
        for value in values {
            self.i16(*value);
        }
        self
    }

    fn f32s(&mut self, values: &[f32]) -> &mut Self {
        for value in values {
            self.f32(*value);
        }
        self
    }
}

fn header_for(packet: PacketType, player_car_index: u8) -> PacketHeader {
    PacketHeader {
        packet_format: PACKET_FORMAT,
        game_major_version: 1,
        game_minor_version: 19,
        packet_version: 1,
        packet_id: packet.id(),
        session_uid: 0x0123_4567_89ab_cdef,
        session_time: 12.5,
        frame_identifier: 1,
        player_car_index,
        secondary_player_car_index: 255,
    }
}

fn write_header(writer: &mut LeWriter, header: &PacketHeader) {
    writer
        .at(0)
        .u16(header.packet_format)
        .u8(header.game_major_version)
        .u8(header.game_minor_version)
        .u8(header.packet_version)
        .u8(header.packet_id)
        .u64(header.session_uid)
        .f32(header.session_time)
        .u32(header.frame_identifier)
        .u8(header.player_car_index)
        .u8(header.secondary_player_car_index);
}

/// A car telemetry packet (id 6) under construction.
#[derive(Debug, Clone)]
pub struct TelemetryDatagram {
    pub header: PacketHeader,
    pub cars: [CarTelemetry; layout::MAX_PARTICIPANTS],
    pub trailer: TelemetryTrailer,
}

impl TelemetryDatagram {
    pub fn new(player_car_index: u8) -> Self {
        Self {
            header: header_for(PacketType::CarTelemetry, player_car_index),
            cars: [CarTelemetry::default(); layout::MAX_PARTICIPANTS],
            trailer: TelemetryTrailer {
                mfd_panel_index: 255,
                mfd_panel_index_secondary_player: 255,
                suggested_gear: 0,
            },
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = LeWriter::with_size(layout::TELEMETRY_PACKET_SIZE);
        write_header(&mut writer, &self.header);
        for (index, car) in self.cars.iter().enumerate() {
            let offset = layout::participant_offset(index, layout::TELEMETRY_RECORD_SIZE);
            writer
                .at(offset)
                .u16(car.speed)
                .f32(car.throttle)
                .f32(car.steer)
                .f32(car.brake)
                .u8(car.clutch)
                .i8(car.gear)
                .u16(car.engine_rpm)
                .u8(car.drs)
                .u8(car.rev_lights_percent)
                .u16(car.rev_lights_bit_value)
                .u16s(&car.brakes_temperature)
                .put(&car.tyres_surface_temperature)
                .put(&car.tyres_inner_temperature)
                .u16(car.engine_temperature)
                .f32s(&car.tyres_pressure)
                .put(&car.surface_type);
        }
        writer
            .at(layout::TELEMETRY_TRAILER_OFFSET)
            .u8(self.trailer.mfd_panel_index)
            .u8(self.trailer.mfd_panel_index_secondary_player)
            .i8(self.trailer.suggested_gear);
        writer.finish()
    }
}

/// A car status packet (id 7) under construction.
#[derive(Debug, Clone)]
pub struct StatusDatagram {
    pub header: PacketHeader,
    pub cars: [CarStatus; layout::MAX_PARTICIPANTS],
}

impl StatusDatagram {
    pub fn new(player_car_index: u8) -> Self {
        Self {
            header: header_for(PacketType::CarStatus, player_car_index),
            cars: [CarStatus::default(); layout::MAX_PARTICIPANTS],
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = LeWriter::with_size(layout::STATUS_PACKET_SIZE);
        write_header(&mut writer, &self.header);
        for (index, car) in self.cars.iter().enumerate() {
            let offset = layout::participant_offset(index, layout::STATUS_RECORD_SIZE);
            writer
                .at(offset)
                .u8(car.traction_control)
                .u8(car.anti_lock_brakes)
                .u8(car.fuel_mix)
                .u8(car.front_brake_bias)
                .u8(car.pit_limiter_status)
                .f32(car.fuel_in_tank)
                .f32(car.fuel_capacity)
                .f32(car.fuel_remaining_laps)
                .u16(car.max_rpm)
                .u16(car.idle_rpm)
                .u8(car.max_gears)
                .u8(car.drs_allowed)
                .u16(car.drs_activation_distance)
                .u8(car.actual_tyre_compound)
                .u8(car.visual_tyre_compound)
                .u8(car.tyres_age_laps)
                .i8(car.vehicle_fia_flags)
                .f32(car.ers_store_energy)
                .u8(car.ers_deploy_mode)
                .f32(car.ers_harvested_this_lap_mguk)
                .f32(car.ers_harvested_this_lap_mguh)
                .f32(car.ers_deployed_this_lap)
                .u8(car.network_paused);
        }
        writer.finish()
    }
}

/// A motion packet (id 0) under construction.
#[derive(Debug, Clone)]
pub struct MotionDatagram {
    pub header: PacketHeader,
    pub cars: [CarMotion; layout::MAX_PARTICIPANTS],
    pub trailer: MotionTrailer,
}

impl MotionDatagram {
    pub fn new(player_car_index: u8) -> Self {
        Self {
            header: header_for(PacketType::Motion, player_car_index),
            cars: [CarMotion::default(); layout::MAX_PARTICIPANTS],
            trailer: MotionTrailer::default(),
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut writer = LeWriter::with_size(layout::MOTION_PACKET_SIZE);
        write_header(&mut writer, &self.header);
        for (index, car) in self.cars.iter().enumerate() {
            let offset = layout::participant_offset(index, layout::MOTION_RECORD_SIZE);
            writer
                .at(offset)
                .f32s(&car.world_position)
                .f32s(&car.world_velocity)
                .i16s(&car.world_forward_dir)
                .i16s(&car.world_right_dir)
                .f32(car.g_force_lateral)
                .f32(car.g_force_longitudinal)
                .f32(car.g_force_vertical)
                .f32(car.yaw)
                .f32(car.pitch)
                .f32(car.roll);
        }
        let trailer = &self.trailer;
        writer
            .at(layout::MOTION_TRAILER_OFFSET)
            .f32s(&trailer.suspension_position)
            .f32s(&trailer.suspension_velocity)
            .f32s(&trailer.suspension_acceleration)
            .f32s(&trailer.wheel_speed)
            .f32s(&trailer.wheel_slip)
            .f32s(&trailer.local_velocity)
            .f32s(&trailer.angular_velocity)
            .f32s(&trailer.angular_acceleration)
            .f32(trailer.front_wheels_angle);
        writer.finish()
    }
}

/// A plausible mid-race telemetry record.
pub fn telemetry_record() -> CarTelemetry {
    CarTelemetry {
        speed: 180,
        throttle: 0.8,
        steer: -0.1,
        brake: 0.0,
        clutch: 0,
        gear: 5,
        engine_rpm: 10_500,
        drs: 0,
        rev_lights_percent: 60,
        rev_lights_bit_value: 0x01ff,
        brakes_temperature: [520, 521, 610, 612],
        tyres_surface_temperature: [95, 96, 99, 98],
        tyres_inner_temperature: [100, 100, 102, 101],
        engine_temperature: 105,
        tyres_pressure: [21.5, 21.5, 23.0, 23.0],
        surface_type: [0; 4],
    }
}

/// A plausible mid-race status record.
pub fn status_record() -> CarStatus {
    CarStatus {
        traction_control: 0,
        anti_lock_brakes: 0,
        fuel_mix: 1,
        front_brake_bias: 56,
        pit_limiter_status: 0,
        fuel_in_tank: 42.75,
        fuel_capacity: 110.0,
        fuel_remaining_laps: 12.5,
        max_rpm: 13_000,
        idle_rpm: 4_000,
        max_gears: 8,
        drs_allowed: 1,
        drs_activation_distance: 0,
        actual_tyre_compound: 17,
        visual_tyre_compound: 17,
        tyres_age_laps: 9,
        vehicle_fia_flags: 0,
        ers_store_energy: 2_000_000.0,
        ers_deploy_mode: 1,
        ers_harvested_this_lap_mguk: 150_000.0,
        ers_harvested_this_lap_mguh: 0.0,
        ers_deployed_this_lap: 300_000.0,
        network_paused: 0,
    }
}

/// Wrap `payload` in Ethernet, IPv4 and UDP headers, checksums included.
///
/// Fails when the payload does not fit the IPv4 or UDP length fields.
pub fn build_ipv4_udp_packet(
    src_ip: [u8; 4],
    dst_ip: [u8; 4],
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, BuildWriteError> {
    let builder = PacketBuilder::ethernet2(GAME_MAC, BRIDGE_MAC)
        .ipv4(src_ip, dst_ip, IPV4_TTL)
        .udp(src_port, dst_port);
    let mut packet = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut packet, payload)?;
    Ok(packet)
}

/// Serialize Ethernet frames into a big-endian, single-interface PCAPNG
/// file. Timestamps are microseconds since the epoch.
pub fn pcapng_capture(packets: &[(u64, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    push_block(&mut out, SECTION_HEADER_BLOCK, |body| {
        body.extend_from_slice(&BYTE_ORDER_MAGIC.to_be_bytes());
        body.extend_from_slice(&[0, 1, 0, 0]); // version 1.0
        body.extend_from_slice(&u64::MAX.to_be_bytes()); // section length unknown
    });
    push_block(&mut out, INTERFACE_DESCRIPTION_BLOCK, |body| {
        body.extend_from_slice(&LINKTYPE_ETHERNET.to_be_bytes());
        body.extend_from_slice(&[0, 0]);
        body.extend_from_slice(&SNAPLEN.to_be_bytes());
    });
    for (ts_us, frame) in packets {
        let captured = (frame.len() as u32).to_be_bytes();
        push_block(&mut out, ENHANCED_PACKET_BLOCK, |body| {
            body.extend_from_slice(&0u32.to_be_bytes()); // interface 0
            body.extend_from_slice(&((ts_us >> 32) as u32).to_be_bytes());
            body.extend_from_slice(&(*ts_us as u32).to_be_bytes());
            body.extend_from_slice(&captured);
            body.extend_from_slice(&captured);
            body.extend_from_slice(frame);
        });
    }
    out
}

/// Append one block: type, total length, body padded to 32 bits, and the
/// trailing copy of the total length.
fn push_block(out: &mut Vec<u8>, block_type: u32, body: impl FnOnce(&mut Vec<u8>)) {
    let start = out.len();
    out.extend_from_slice(&block_type.to_be_bytes());
    out.extend_from_slice(&[0; 4]);
    body(out);
    out.resize(out.len().next_multiple_of(4), 0);
    let total = (out.len() - start + 4) as u32;
    out[start + 4..start + 8].copy_from_slice(&total.to_be_bytes());
    out.extend_from_slice(&total.to_be_bytes());
}
