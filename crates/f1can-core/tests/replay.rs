use std::fs;
use std::path::Path;

use f1can_core::mapping::{ConversionProfile, Revision};
use f1can_core::protocols::f1::PacketType;
use f1can_core::sink::{CandumpSink, CollectingSink};
use f1can_core::source::{CaptureDatagramSource, DEFAULT_PORT, DatagramSource, SourceError};
use f1can_core::synth::{
    MotionDatagram, TelemetryDatagram, build_ipv4_udp_packet, pcapng_capture,
};
use f1can_core::{Dispatcher, replay_capture};

const GAME: [u8; 4] = [10, 0, 0, 1];
const BRIDGE: [u8; 4] = [10, 0, 0, 2];
const START_US: u64 = 1_700_000_000_000_000;

fn write_capture(dir: &Path, datagrams: &[(u16, Vec<u8>)]) -> std::path::PathBuf {
    let packets: Vec<(u64, Vec<u8>)> = datagrams
        .iter()
        .enumerate()
        .map(|(idx, (port, payload))| {
            let frame = build_ipv4_udp_packet(GAME, BRIDGE, 40_000, *port, payload).unwrap();
            (START_US + idx as u64 * 50_000, frame)
        })
        .collect();
    let path = dir.join("session.pcapng");
    fs::write(&path, pcapng_capture(&packets)).unwrap();
    path
}

fn telemetry(speed: u16) -> Vec<u8> {
    let mut datagram = TelemetryDatagram::new(0);
    datagram.cars[0].speed = speed;
    datagram.encode()
}

#[test]
fn capture_source_filters_by_port() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_capture(
        dir.path(),
        &[
            (DEFAULT_PORT, telemetry(100)),
            (6454, vec![1, 2, 3]),
            (DEFAULT_PORT, telemetry(200)),
        ],
    );

    let mut source = CaptureDatagramSource::open(&path)
        .unwrap()
        .with_port(DEFAULT_PORT);
    let mut lengths = Vec::new();
    while let Some(datagram) = source.next_datagram().unwrap() {
        lengths.push(datagram.len());
    }
    assert_eq!(lengths, vec![1347, 1347]);
    assert_eq!(source.stats().packets_total, 3);
    assert_eq!(source.stats().datagrams, 2);
    assert_eq!(source.stats().skipped, 1);
}

#[test]
fn replay_reports_dispatch_counters() {
    let dir = tempfile::tempdir().unwrap();
    let mut motion = MotionDatagram::new(0);
    motion.cars[0].g_force_lateral = 0.0;
    let mut unsupported = vec![0u8; 200];
    unsupported[5] = 2;
    let path = write_capture(
        dir.path(),
        &[
            (DEFAULT_PORT, telemetry(180)),
            (DEFAULT_PORT, motion.encode()),
            (DEFAULT_PORT, unsupported),
            (DEFAULT_PORT, vec![0u8; 10]),
        ],
    );

    let mut dispatcher = Dispatcher::new(ConversionProfile::for_revision(Revision::Obd2));
    let mut sink = CollectingSink::new();
    let report =
        replay_capture(&path, Some(DEFAULT_PORT), &mut dispatcher, &mut sink).unwrap();

    assert_eq!(report.profile, "obd2");
    assert_eq!(report.capture_summary.packets_total, 4);
    assert_eq!(report.capture_summary.datagrams, 4);
    assert_eq!(
        report.capture_summary.time_start.as_deref(),
        Some("2023-11-14T22:13:20Z")
    );
    assert_eq!(
        Some(report.generated_at.as_str()),
        report.capture_summary.time_end.as_deref()
    );
    assert_eq!(report.dispatch.datagrams, 4);
    assert_eq!(report.dispatch.ignored, 1);
    assert_eq!(report.dispatch.dispatched[&PacketType::CarTelemetry], 1);
    assert_eq!(report.dispatch.dispatched[&PacketType::Motion], 1);
    assert_eq!(report.dispatch.failures["truncated_buffer"], 1);
    assert_eq!(report.dispatch.frames_sent, 8);
    assert_eq!(sink.frames.len(), 8);
    assert_eq!(sink.frames[6].payload(), &32_000u16.to_be_bytes());
}

#[test]
fn replay_to_candump_text() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_capture(dir.path(), &[(DEFAULT_PORT, telemetry(180))]);

    let mut dispatcher = Dispatcher::new(ConversionProfile::default());
    let mut sink = CandumpSink::new(Vec::new(), "vcan0");
    replay_capture(&path, None, &mut dispatcher, &mut sink).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    let first_lines: Vec<&str> = text.lines().take(2).collect();
    assert_eq!(first_lines, vec!["vcan0 400#B4", "vcan0 401#0AF0"]);
}

/// Little-endian classic pcap: global header, then one record per frame.
fn legacy_pcap(frames: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&0xA1B2_C3D4u32.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&[0; 8]);
    out.extend_from_slice(&65_535u32.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    for (sec, usec, frame) in frames {
        out.extend_from_slice(&sec.to_le_bytes());
        out.extend_from_slice(&usec.to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        out.extend_from_slice(frame);
    }
    out
}

#[test]
fn legacy_pcap_capture_replays() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.pcap");
    let frames: Vec<(u32, u32, Vec<u8>)> = [(1_700_000_000, 0), (1_700_000_001, 500_000)]
        .into_iter()
        .map(|(sec, usec)| {
            let frame =
                build_ipv4_udp_packet(GAME, BRIDGE, 40_000, DEFAULT_PORT, &telemetry(120)).unwrap();
            (sec, usec, frame)
        })
        .collect();
    fs::write(&path, legacy_pcap(&frames)).unwrap();

    let mut source = CaptureDatagramSource::open(&path)
        .unwrap()
        .with_port(DEFAULT_PORT);
    let mut count = 0;
    while let Some(datagram) = source.next_datagram().unwrap() {
        assert_eq!(datagram.len(), 1347);
        count += 1;
    }
    assert_eq!(count, 2);
    assert_eq!(source.stats().first_ts, Some(1_700_000_000.0));
    assert_eq!(source.stats().last_ts, Some(1_700_000_001.5));
}

#[test]
fn truncated_capture_is_a_source_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.pcapng");
    fs::write(&path, [0x0a, 0x0d, 0x0d]).unwrap();
    let err = match CaptureDatagramSource::open(&path) {
        Ok(_) => panic!("expected truncated file to be rejected"),
        Err(err) => err,
    };
    assert!(matches!(err, SourceError::Io(_)));
}
