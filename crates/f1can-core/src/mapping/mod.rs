//! Field mapping and unit conversion.
//!
//! A [`ConversionProfile`] lists, per packet type, which signal goes to which
//! CAN identifier and through which linear law. Profiles are keyed by
//! [`Revision`] so the scale constants live in one table instead of being
//! repeated per call site.

pub mod convert;
pub mod error;
pub mod mapper;
pub mod profile;
pub mod signals;

pub use convert::{Conversion, OverflowPolicy, Rounding, max_raw};
pub use error::{MappingError, ProfileError};
pub use mapper::{MappedValue, map_record};
pub use profile::{ConversionProfile, Revision, SignalRule, ids};
pub use signals::{MotionSignal, SignalSource, StatusSignal, TelemetrySignal};
