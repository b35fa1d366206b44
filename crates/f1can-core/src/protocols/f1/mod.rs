//! F1 22 UDP telemetry decoding.
//!
//! `header` classifies a datagram by its type tag, the per-type parsers
//! (`telemetry`, `status`, `motion`) decode the full fixed layout, and
//! `select` extracts the local participant's record. Offsets live in
//! `layout`; every read goes through the bounded little-endian `reader`.

pub mod error;
pub mod header;
pub mod layout;
pub mod motion;
pub mod reader;
pub mod select;
pub mod status;
pub mod telemetry;

pub use error::F1Error;
pub use header::{Classification, PacketHeader, PacketType, classify};
pub use motion::{CarMotion, MotionPacket, MotionTrailer, decode_motion};
pub use select::{ParticipantPacket, select_participant};
pub use status::{CarStatus, StatusPacket, decode_status};
pub use telemetry::{CarTelemetry, TelemetryPacket, TelemetryTrailer, decode_telemetry};
