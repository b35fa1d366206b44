use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::protocols::f1::PacketType;

/// Running counters for one dispatcher. Maps are ordered so serialized
/// reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStats {
    pub datagrams: u64,
    /// Datagrams with a tag outside the supported set.
    pub ignored: u64,
    /// Datagrams that produced frames, per packet type.
    pub dispatched: BTreeMap<PacketType, u64>,
    pub frames_sent: u64,
    /// Dropped datagrams keyed by [`DispatchError::kind`](super::DispatchError::kind).
    pub failures: BTreeMap<String, u64>,
    pub transmit_errors: u64,
}

impl DispatchStats {
    pub fn dropped(&self) -> u64 {
        self.failures.values().sum()
    }
}
