use thiserror::Error;

/// Errors returned while mapping a participant record to raw frame values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    #[error("{signal} value {value} does not fit in {length} byte(s)")]
    Overflow {
        signal: String,
        value: f64,
        length: u8,
    },
}

/// Errors returned when loading or validating a conversion profile.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid profile JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{signal}: unsupported frame length {length} (expected 1, 2, 4 or 8)")]
    InvalidLength { signal: String, length: u8 },
    #[error("{signal}: invalid CAN identifier {id:#x}")]
    InvalidIdentifier { signal: String, id: u32 },
    #[error("{signal}: factor must be finite and non-zero, got {factor}")]
    InvalidFactor { signal: String, factor: f64 },
    #[error("{signal}: offset must be finite, got {offset}")]
    InvalidOffset { signal: String, offset: f64 },
    #[error("unknown revision '{0}' (expected obd2 or passthrough)")]
    UnknownRevision(String),
}
