use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::convert::{Conversion, OverflowPolicy, Rounding};
use super::error::ProfileError;
use super::signals::{MotionSignal, StatusSignal, TelemetrySignal};
use crate::protocols::can::layout as can_layout;

/// One output field: which signal, which frame, and how to convert it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRule<S> {
    pub signal: S,
    pub id: u32,
    pub length: u8,
    #[serde(flatten)]
    pub conversion: Conversion,
}

impl<S> SignalRule<S> {
    pub const fn new(signal: S, id: u32, length: u8, conversion: Conversion) -> Self {
        Self {
            signal,
            id,
            length,
            conversion,
        }
    }
}

/// Built-in conversion tables, one per target protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Revision {
    /// OBD-II compatible PIDs plus extended custom frames.
    #[default]
    Obd2,
    /// Raw units where the bus side does its own scaling.
    Passthrough,
}

impl Revision {
    pub fn name(self) -> &'static str {
        match self {
            Self::Obd2 => "obd2",
            Self::Passthrough => "passthrough",
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Revision {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "obd2" => Ok(Self::Obd2),
            "passthrough" => Ok(Self::Passthrough),
            other => Err(ProfileError::UnknownRevision(other.to_string())),
        }
    }
}

/// Frame identifiers used by the built-in revisions.
pub mod ids {
    pub const ENGINE_TEMPERATURE: u32 = 0x005;
    pub const ENGINE_RPM: u32 = 0x00C;
    pub const THROTTLE: u32 = 0x011;
    pub const FUEL_CAPACITY: u32 = 0x0D1;
    pub const FUEL_IN_TANK: u32 = 0x0D2;
    pub const SPEED_LEGACY: u32 = 0x400;
    pub const SPEED_EXTENDED: u32 = 0x401;
    pub const BRAKE: u32 = 0x402;
    pub const G_FORCE_LATERAL: u32 = 0x410;
    pub const G_FORCE_LONGITUDINAL: u32 = 0x411;
}

/// The full mapping table for every supported packet type.
///
/// Profiles are data: the built-in revisions can be dumped to JSON, edited,
/// and loaded back with [`ConversionProfile::load`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionProfile {
    pub name: String,
    #[serde(default)]
    pub telemetry: Vec<SignalRule<TelemetrySignal>>,
    #[serde(default)]
    pub status: Vec<SignalRule<StatusSignal>>,
    #[serde(default)]
    pub motion: Vec<SignalRule<MotionSignal>>,
}

impl Default for ConversionProfile {
    fn default() -> Self {
        Self::for_revision(Revision::default())
    }
}

impl ConversionProfile {
    pub fn for_revision(revision: Revision) -> Self {
        match revision {
            Revision::Obd2 => obd2(),
            Revision::Passthrough => passthrough(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, ProfileError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Check frame widths, identifiers and conversion constants.
    pub fn validate(&self) -> Result<(), ProfileError> {
        self.telemetry.iter().try_for_each(validate_rule)?;
        self.status.iter().try_for_each(validate_rule)?;
        self.motion.iter().try_for_each(validate_rule)
    }
}

fn validate_rule<S: fmt::Display>(rule: &SignalRule<S>) -> Result<(), ProfileError> {
    let signal = || rule.signal.to_string();
    if !can_layout::SUPPORTED_LENGTHS.contains(&rule.length) {
        return Err(ProfileError::InvalidLength {
            signal: signal(),
            length: rule.length,
        });
    }
    if rule.id > can_layout::MAX_EXTENDED_ID {
        return Err(ProfileError::InvalidIdentifier {
            signal: signal(),
            id: rule.id,
        });
    }
    let factor = rule.conversion.factor;
    if !factor.is_finite() || factor == 0.0 {
        return Err(ProfileError::InvalidFactor {
            signal: signal(),
            factor,
        });
    }
    if !rule.conversion.offset.is_finite() {
        return Err(ProfileError::InvalidOffset {
            signal: signal(),
            offset: rule.conversion.offset,
        });
    }
    Ok(())
}

fn motion_rules() -> Vec<SignalRule<MotionSignal>> {
    // Milli-g with a -32 g offset, so 0 g is 32000.
    let g_force = Conversion::linear(-32.0, 1000.0).rounding(Rounding::Nearest);
    vec![
        SignalRule::new(MotionSignal::GForceLateral, ids::G_FORCE_LATERAL, 2, g_force),
        SignalRule::new(
            MotionSignal::GForceLongitudinal,
            ids::G_FORCE_LONGITUDINAL,
            2,
            g_force,
        ),
    ]
}

fn obd2() -> ConversionProfile {
    ConversionProfile {
        name: Revision::Obd2.name().to_string(),
        telemetry: vec![
            // PID 0x0D: one byte of km/h.
            SignalRule::new(
                TelemetrySignal::Speed,
                ids::SPEED_LEGACY,
                1,
                Conversion::identity(),
            ),
            // 0.1 km/h resolution from -100 km/h.
            SignalRule::new(
                TelemetrySignal::Speed,
                ids::SPEED_EXTENDED,
                2,
                Conversion::linear(-100.0, 10.0),
            ),
            // PID 0x0C: (256A + B) / 4.
            SignalRule::new(
                TelemetrySignal::EngineRpm,
                ids::ENGINE_RPM,
                2,
                Conversion::linear(0.0, 4.0),
            ),
            // PID 0x11: 100 / 255 * A.
            SignalRule::new(
                TelemetrySignal::Throttle,
                ids::THROTTLE,
                1,
                Conversion::linear(0.0, 255.0),
            ),
            SignalRule::new(
                TelemetrySignal::Brake,
                ids::BRAKE,
                1,
                Conversion::linear(0.0, 255.0),
            ),
            // PID 0x05: A - 40.
            SignalRule::new(
                TelemetrySignal::EngineTemperature,
                ids::ENGINE_TEMPERATURE,
                1,
                Conversion::linear(-40.0, 1.0),
            ),
        ],
        status: vec![
            SignalRule::new(
                StatusSignal::FuelCapacity,
                ids::FUEL_CAPACITY,
                4,
                Conversion::identity(),
            ),
            SignalRule::new(
                StatusSignal::FuelInTank,
                ids::FUEL_IN_TANK,
                4,
                Conversion::identity(),
            ),
        ],
        motion: motion_rules(),
    }
}

fn passthrough() -> ConversionProfile {
    let percent = Conversion::linear(0.0, 100.0);
    let centi_kg = Conversion::linear(0.0, 100.0).overflow(OverflowPolicy::Reject);
    ConversionProfile {
        name: Revision::Passthrough.name().to_string(),
        telemetry: vec![
            SignalRule::new(
                TelemetrySignal::Speed,
                ids::SPEED_LEGACY,
                1,
                Conversion::identity(),
            ),
            SignalRule::new(
                TelemetrySignal::Speed,
                ids::SPEED_EXTENDED,
                2,
                Conversion::identity(),
            ),
            SignalRule::new(
                TelemetrySignal::EngineRpm,
                ids::ENGINE_RPM,
                2,
                Conversion::linear(0.0, 4.0),
            ),
            SignalRule::new(TelemetrySignal::Throttle, ids::THROTTLE, 1, percent),
            SignalRule::new(TelemetrySignal::Brake, ids::BRAKE, 1, percent),
            SignalRule::new(
                TelemetrySignal::EngineTemperature,
                ids::ENGINE_TEMPERATURE,
                1,
                Conversion::linear(-40.0, 1.0),
            ),
        ],
        status: vec![
            SignalRule::new(StatusSignal::FuelCapacity, ids::FUEL_CAPACITY, 2, centi_kg),
            SignalRule::new(StatusSignal::FuelInTank, ids::FUEL_IN_TANK, 2, centi_kg),
        ],
        motion: motion_rules(),
    }
}
