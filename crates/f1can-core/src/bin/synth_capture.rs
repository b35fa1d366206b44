use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use f1can_core::source::DEFAULT_PORT;
use f1can_core::synth::{
    MotionDatagram, StatusDatagram, TelemetryDatagram, build_ipv4_udp_packet, pcapng_capture,
    status_record, telemetry_record,
};

const GAME_IP: [u8; 4] = [192, 168, 1, 20];
const BRIDGE_IP: [u8; 4] = [192, 168, 1, 10];
const GAME_SRC_PORT: u16 = 50_000;
const PLAYER_INDEX: u8 = 3;
/// 2022-07-01T12:00:00Z, in microseconds.
const START_US: u64 = 1_656_676_800_000_000;
/// Telemetry tick at the game's 20 Hz default.
const TICK_US: u64 = 50_000;

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let path = env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| "usage: synth_capture <output.pcapng> [ticks]".to_string())?;
    let ticks = match env::args().nth(2) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|err| format!("invalid tick count '{raw}': {err}"))?,
        None => 20,
    };

    let mut packets = Vec::new();
    for tick in 0..ticks {
        for (n, datagram) in datagrams_for_tick(tick).into_iter().enumerate() {
            let ts = START_US + tick * TICK_US + n as u64;
            let frame =
                build_ipv4_udp_packet(GAME_IP, BRIDGE_IP, GAME_SRC_PORT, DEFAULT_PORT, &datagram)
                    .map_err(|err| format!("failed to frame datagram: {err}"))?;
            packets.push((ts, frame));
        }
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create {}: {}", parent.display(), err))?;
        }
    }
    fs::write(&path, pcapng_capture(&packets))
        .map_err(|err| format!("failed to write {}: {}", path.display(), err))?;
    eprintln!("wrote {} packets -> {}", packets.len(), path.display());
    Ok(())
}

/// One lap-like ramp: speed and revs climb with the tick, fuel burns off.
fn datagrams_for_tick(tick: u64) -> Vec<Vec<u8>> {
    let index = usize::from(PLAYER_INDEX);
    let step = (tick % 100) as f32;

    let mut telemetry = TelemetryDatagram::new(PLAYER_INDEX);
    telemetry.header.frame_identifier = tick as u32;
    telemetry.cars[index] = telemetry_record();
    telemetry.cars[index].speed = 80 + (step as u16) * 2;
    telemetry.cars[index].engine_rpm = 9_000 + (step as u16) * 30;
    telemetry.cars[index].throttle = (step / 100.0).min(1.0);

    let mut status = StatusDatagram::new(PLAYER_INDEX);
    status.header.frame_identifier = tick as u32;
    status.cars[index] = status_record();
    status.cars[index].fuel_in_tank = 100.0 - step * 0.05;

    let mut motion = MotionDatagram::new(PLAYER_INDEX);
    motion.header.frame_identifier = tick as u32;
    motion.cars[index].g_force_lateral = (step - 50.0) / 25.0;
    motion.cars[index].g_force_longitudinal = 0.5;

    vec![telemetry.encode(), status.encode(), motion.encode()]
}
