use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocols::f1::{CarMotion, CarStatus, CarTelemetry};

/// A participant record whose fields can be read as physical values.
pub trait SignalSource {
    type Signal: Copy + fmt::Display;

    fn value(&self, signal: Self::Signal) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelemetrySignal {
    /// km/h.
    Speed,
    /// 0.0 to 1.0.
    Throttle,
    /// 0.0 to 1.0.
    Brake,
    /// -1.0 to 1.0.
    Steer,
    /// 0 to 100.
    Clutch,
    /// -1 to 8.
    Gear,
    EngineRpm,
    /// Celsius.
    EngineTemperature,
    RevLightsPercent,
    Drs,
}

impl TelemetrySignal {
    pub fn name(self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Throttle => "throttle",
            Self::Brake => "brake",
            Self::Steer => "steer",
            Self::Clutch => "clutch",
            Self::Gear => "gear",
            Self::EngineRpm => "engine_rpm",
            Self::EngineTemperature => "engine_temperature",
            Self::RevLightsPercent => "rev_lights_percent",
            Self::Drs => "drs",
        }
    }
}

impl fmt::Display for TelemetrySignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SignalSource for CarTelemetry {
    type Signal = TelemetrySignal;

    fn value(&self, signal: TelemetrySignal) -> f64 {
        match signal {
            TelemetrySignal::Speed => f64::from(self.speed),
            TelemetrySignal::Throttle => f64::from(self.throttle),
            TelemetrySignal::Brake => f64::from(self.brake),
            TelemetrySignal::Steer => f64::from(self.steer),
            TelemetrySignal::Clutch => f64::from(self.clutch),
            TelemetrySignal::Gear => f64::from(self.gear),
            TelemetrySignal::EngineRpm => f64::from(self.engine_rpm),
            TelemetrySignal::EngineTemperature => f64::from(self.engine_temperature),
            TelemetrySignal::RevLightsPercent => f64::from(self.rev_lights_percent),
            TelemetrySignal::Drs => f64::from(self.drs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSignal {
    /// kg.
    FuelInTank,
    /// kg.
    FuelCapacity,
    FuelRemainingLaps,
    /// Joules.
    ErsStoreEnergy,
    FrontBrakeBias,
    TyresAgeLaps,
    MaxRpm,
}

impl StatusSignal {
    pub fn name(self) -> &'static str {
        match self {
            Self::FuelInTank => "fuel_in_tank",
            Self::FuelCapacity => "fuel_capacity",
            Self::FuelRemainingLaps => "fuel_remaining_laps",
            Self::ErsStoreEnergy => "ers_store_energy",
            Self::FrontBrakeBias => "front_brake_bias",
            Self::TyresAgeLaps => "tyres_age_laps",
            Self::MaxRpm => "max_rpm",
        }
    }
}

impl fmt::Display for StatusSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SignalSource for CarStatus {
    type Signal = StatusSignal;

    fn value(&self, signal: StatusSignal) -> f64 {
        match signal {
            StatusSignal::FuelInTank => f64::from(self.fuel_in_tank),
            StatusSignal::FuelCapacity => f64::from(self.fuel_capacity),
            StatusSignal::FuelRemainingLaps => f64::from(self.fuel_remaining_laps),
            StatusSignal::ErsStoreEnergy => f64::from(self.ers_store_energy),
            StatusSignal::FrontBrakeBias => f64::from(self.front_brake_bias),
            StatusSignal::TyresAgeLaps => f64::from(self.tyres_age_laps),
            StatusSignal::MaxRpm => f64::from(self.max_rpm),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionSignal {
    GForceLateral,
    GForceLongitudinal,
    GForceVertical,
    /// Radians.
    Yaw,
    Pitch,
    Roll,
}

impl MotionSignal {
    pub fn name(self) -> &'static str {
        match self {
            Self::GForceLateral => "g_force_lateral",
            Self::GForceLongitudinal => "g_force_longitudinal",
            Self::GForceVertical => "g_force_vertical",
            Self::Yaw => "yaw",
            Self::Pitch => "pitch",
            Self::Roll => "roll",
        }
    }
}

impl fmt::Display for MotionSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl SignalSource for CarMotion {
    type Signal = MotionSignal;

    fn value(&self, signal: MotionSignal) -> f64 {
        match signal {
            MotionSignal::GForceLateral => f64::from(self.g_force_lateral),
            MotionSignal::GForceLongitudinal => f64::from(self.g_force_longitudinal),
            MotionSignal::GForceVertical => f64::from(self.g_force_vertical),
            MotionSignal::Yaw => f64::from(self.yaw),
            MotionSignal::Pitch => f64::from(self.pitch),
            MotionSignal::Roll => f64::from(self.roll),
        }
    }
}
