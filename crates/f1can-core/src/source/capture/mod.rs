//! PCAP/PCAPNG replay source.
//!
//! Reads recorded game traffic and yields the UDP payloads addressed to the
//! telemetry port, so the dispatcher can be driven from a file exactly as
//! from the live socket.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod udp;

pub use parser::{CaptureDatagramSource, CaptureStats};
