use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

use f1can_core::source::DEFAULT_PORT;
use f1can_core::synth::{TelemetryDatagram, build_ipv4_udp_packet, pcapng_capture};

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("f1can"))
}

fn sample_capture(dir: &Path) -> PathBuf {
    let mut datagram = TelemetryDatagram::new(3);
    datagram.cars[3].speed = 180;
    let frame = build_ipv4_udp_packet(
        [10, 0, 0, 1],
        [10, 0, 0, 2],
        40_000,
        DEFAULT_PORT,
        &datagram.encode(),
    )
    .expect("frame datagram");
    let path = dir.join("session.pcapng");
    fs::write(&path, pcapng_capture(&[(1_700_000_000_000_000, frame)])).expect("write capture");
    path
}

#[test]
fn help_lists_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("bridge").and(contains("replay")).and(contains("profile")));
    cmd().arg("replay").arg("--help").assert().success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");

    cmd()
        .arg("replay")
        .arg(missing)
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.txt");
    fs::write(&input, b"not a capture").expect("write input");

    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn replay_stdout_outputs_json_report() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());

    let assert = cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("--quiet")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let report: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(report["profile"], "obd2");
    assert_eq!(report["tool"]["name"], "f1can");
    assert_eq!(report["capture_summary"]["datagrams"], 1);
    assert_eq!(report["dispatch"]["dispatched"]["car_telemetry"], 1);
    assert_eq!(report["dispatch"]["frames_sent"], 6);
}

#[test]
fn replay_writes_report_file() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let report = temp.path().join("out").join("report.json");

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("-o")
        .arg(&report)
        .arg("--revision")
        .arg("passthrough")
        .assert()
        .success()
        .stderr(contains("OK: report written"));

    let json: Value =
        serde_json::from_str(&fs::read_to_string(&report).expect("read report")).expect("json");
    assert_eq!(json["profile"], "passthrough");
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let report = temp.path().join("report.json");

    cmd()
        .arg("replay")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn replay_candump_prints_frames() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let report = temp.path().join("report.json");

    cmd()
        .arg("replay")
        .arg(input)
        .arg("--candump")
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stdout(contains("replay 400#B4\nreplay 401#0AF0\n"));
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let report = temp.path().join("report.json");

    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn report_path_must_differ_from_input() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());

    cmd()
        .arg("replay")
        .arg(&input)
        .arg("-o")
        .arg(&input)
        .assert()
        .code(2)
        .stderr(contains("report path must differ from input"));
}

#[test]
fn glob_with_multiple_matches_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    sample_capture(temp.path());
    fs::copy(
        temp.path().join("session.pcapng"),
        temp.path().join("second.pcapng"),
    )
    .expect("copy capture");

    cmd()
        .arg("replay")
        .arg(temp.path().join("*.pcapng"))
        .arg("--stdout")
        .assert()
        .code(2)
        .stderr(contains("multiple files match pattern").and(contains("hint:")));
}

#[test]
fn invalid_profile_file_has_hint() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());
    let profile = temp.path().join("profile.json");
    fs::write(
        &profile,
        r#"{ "name": "bad", "telemetry": [{ "signal": "speed", "id": 1024, "length": 3 }] }"#,
    )
    .expect("write profile");

    cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("--profile")
        .arg(profile)
        .assert()
        .code(2)
        .stderr(contains("unsupported frame length 3").and(contains("profile show")));
}

#[test]
fn profile_show_round_trips_through_replay() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(temp.path());

    let assert = cmd()
        .arg("profile")
        .arg("show")
        .arg("--revision")
        .arg("passthrough")
        .arg("--pretty")
        .assert()
        .success();
    let json = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let profile: Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(profile["name"], "passthrough");

    let profile_path = temp.path().join("profile.json");
    fs::write(&profile_path, json).expect("write profile");
    let assert = cmd()
        .arg("replay")
        .arg(input)
        .arg("--stdout")
        .arg("--profile")
        .arg(profile_path)
        .assert()
        .success();
    let report: Value =
        serde_json::from_slice(&assert.get_output().stdout).expect("valid json report");
    assert_eq!(report["profile"], "passthrough");
}

#[test]
fn unknown_revision_is_a_usage_error() {
    cmd()
        .arg("profile")
        .arg("show")
        .arg("--revision")
        .arg("v9")
        .assert()
        .failure()
        .stderr(contains("unknown revision"));
}

#[cfg(unix)]
mod bridge {
    use std::io::{BufRead, BufReader, Read};
    use std::net::UdpSocket;
    use std::process::{Command, Stdio};
    use std::sync::mpsc::{self, Receiver};
    use std::thread;
    use std::time::Duration;

    use f1can_core::synth::TelemetryDatagram;

    const LINE_TIMEOUT: Duration = Duration::from_secs(10);

    fn free_port() -> u16 {
        UdpSocket::bind("127.0.0.1:0")
            .and_then(|socket| socket.local_addr())
            .expect("probe free port")
            .port()
    }

    fn lines<R: Read + Send + 'static>(reader: R) -> Receiver<String> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in BufReader::new(reader).lines().map_while(Result::ok) {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        rx
    }

    fn wait_for(rx: &Receiver<String>, needle: &str, seen: &mut Vec<String>) {
        loop {
            let line = rx
                .recv_timeout(LINE_TIMEOUT)
                .unwrap_or_else(|_| panic!("no line containing {needle:?}, saw {seen:?}"));
            let found = line.contains(needle);
            seen.push(line);
            if found {
                return;
            }
        }
    }

    fn bridge_forwards_then_stops_on(signal: libc::c_int) {
        let port = free_port();
        let mut child = Command::new(assert_cmd::cargo::cargo_bin!("f1can"))
            .args(["bridge", "--candump", "--bind", "127.0.0.1"])
            .args(["--port", &port.to_string()])
            .env_remove("RUST_LOG")
            .env_remove("F1CAN_PORT")
            .env_remove("F1CAN_INTERFACE")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn bridge");
        let stdout = lines(child.stdout.take().expect("stdout pipe"));
        let stderr = lines(child.stderr.take().expect("stderr pipe"));

        let mut log = Vec::new();
        wait_for(&stderr, "bridge listening", &mut log);

        let mut datagram = TelemetryDatagram::new(3);
        datagram.cars[3].speed = 180;
        let sender = UdpSocket::bind("127.0.0.1:0").expect("bind sender");
        sender
            .send_to(&datagram.encode(), ("127.0.0.1", port))
            .expect("send datagram");

        let mut frames = Vec::new();
        wait_for(&stdout, "vcan0 401#0AF0", &mut frames);
        assert_eq!(frames, ["vcan0 400#B4", "vcan0 401#0AF0"]);

        let pid = libc::pid_t::try_from(child.id()).expect("pid fits pid_t");
        // SAFETY: plain kill(2) on our own child, which has not been reaped.
        assert_eq!(unsafe { libc::kill(pid, signal) }, 0);
        let status = child.wait().expect("wait for bridge");
        assert!(status.success(), "bridge exited with {status:?}");

        wait_for(&stderr, "OK: 1 datagrams, 6 frames sent, 0 dropped", &mut log);
        assert!(log.iter().all(|line| !line.contains('\u{1b}')), "{log:?}");
    }

    #[test]
    fn bridge_stops_cleanly_on_sigint() {
        bridge_forwards_then_stops_on(libc::SIGINT);
    }

    #[test]
    fn bridge_stops_cleanly_on_sigterm() {
        bridge_forwards_then_stops_on(libc::SIGTERM);
    }
}
