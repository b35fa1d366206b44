//! f1can core library: F1 22 UDP telemetry to CAN frames.
//!
//! Datagrams come from a [`source::DatagramSource`] (live UDP socket or a
//! recorded capture), go through the [`dispatch::Dispatcher`] pipeline
//! (classify, decode, select, map, encode) and leave as CAN frames through a
//! [`sink::FrameSink`]. Decoding is byte-oriented and side-effect free; all
//! I/O lives in `source` and `sink`.
//!
//! Invariants:
//! - Inbound layouts are little-endian, outbound frame payloads big-endian,
//!   and the two never share code.
//! - A datagram either produces every frame its profile lists or none.
//! - Nothing is kept between datagrams except counters.
//!
//! # Examples
//! ```
//! use f1can_core::dispatch::Dispatcher;
//! use f1can_core::mapping::{ConversionProfile, Revision};
//! use f1can_core::synth::TelemetryDatagram;
//!
//! let mut datagram = TelemetryDatagram::new(3);
//! datagram.cars[3].speed = 180;
//!
//! let dispatcher = Dispatcher::new(ConversionProfile::for_revision(Revision::Obd2));
//! let outcome = dispatcher.dispatch(&datagram.encode())?;
//! assert_eq!(outcome.frames()[0].to_string(), "400#B4");
//! # Ok::<(), f1can_core::dispatch::DispatchError>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod dispatch;
pub mod mapping;
pub mod protocols;
pub mod replay;
pub mod sink;
pub mod source;
pub mod synth;

pub use dispatch::{DispatchError, DispatchOutcome, DispatchStats, Dispatcher};
pub use mapping::{ConversionProfile, Revision};
pub use replay::{ReplayError, replay_capture};

/// Current replay report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Result of replaying one capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    pub tool: ToolInfo,
    /// RFC3339 timestamp of the last captured packet, so reports are
    /// reproducible for the same input.
    pub generated_at: String,
    pub input: InputInfo,
    pub capture_summary: CaptureSummary,
    /// Name of the conversion profile used.
    pub profile: String,
    pub dispatch: DispatchStats,
}

/// Tool metadata embedded in reports.
///
/// # Examples
/// ```
/// use f1can_core::ToolInfo;
///
/// let tool = ToolInfo {
///     name: "f1can".to_string(),
///     version: "0.1.0".to_string(),
/// };
/// assert_eq!(tool.name, "f1can");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Capture-level counters (timestamps may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Link-layer packets in the capture.
    pub packets_total: u64,
    /// UDP payloads handed to the dispatcher.
    pub datagrams: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}
