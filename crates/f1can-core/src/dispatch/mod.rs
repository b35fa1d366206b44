//! Per-datagram control flow.
//!
//! Each datagram moves through classify, decode, select, map and encode.
//! Every frame for a datagram is built before the first one is sent, so a
//! failure at any stage drops the whole datagram and nothing half-mapped
//! reaches the bus. Tags other than motion, status and telemetry are
//! filtered out without error.

mod error;
mod stats;

pub use error::{DispatchError, RunError};
pub use stats::DispatchStats;

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::mapping::{ConversionProfile, MappedValue, SignalRule, SignalSource, map_record};
use crate::protocols::can::{OutputFrame, encode_frame};
use crate::protocols::f1::{
    F1Error, PacketType, ParticipantPacket, classify, decode_motion, decode_status,
    decode_telemetry, select_participant,
};
use crate::sink::FrameSink;
use crate::source::DatagramSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    AwaitingDatagram,
    Classified,
    Decoded,
    Selected,
    Mapped,
    Transmitting,
}

/// What one datagram turned into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Tag outside the supported set.
    Ignored { packet_id: u8 },
    /// Frames in profile order, ready to transmit.
    Frames {
        packet: PacketType,
        frames: Vec<OutputFrame>,
    },
}

impl DispatchOutcome {
    pub fn frames(&self) -> &[OutputFrame] {
        match self {
            Self::Ignored { .. } => &[],
            Self::Frames { frames, .. } => frames,
        }
    }
}

pub struct Dispatcher {
    profile: ConversionProfile,
    stats: DispatchStats,
}

impl Dispatcher {
    pub fn new(profile: ConversionProfile) -> Self {
        Self {
            profile,
            stats: DispatchStats::default(),
        }
    }

    pub fn profile(&self) -> &ConversionProfile {
        &self.profile
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Run one datagram through the pipeline without transmitting.
    ///
    /// # Examples
    /// ```
    /// use f1can_core::dispatch::{DispatchOutcome, Dispatcher};
    /// use f1can_core::mapping::ConversionProfile;
    ///
    /// let dispatcher = Dispatcher::new(ConversionProfile::default());
    /// let mut datagram = vec![0u8; 1347];
    /// datagram[5] = 99;
    /// let outcome = dispatcher.dispatch(&datagram)?;
    /// assert_eq!(outcome, DispatchOutcome::Ignored { packet_id: 99 });
    /// # Ok::<(), f1can_core::dispatch::DispatchError>(())
    /// ```
    pub fn dispatch(&self, datagram: &[u8]) -> Result<DispatchOutcome, DispatchError> {
        let class = classify(datagram).map_err(DispatchError::Classify)?;
        trace!(state = ?DispatchState::Classified, packet_id = class.packet_id);

        let index = usize::from(class.player_car_index);
        let (packet, values) = match class.packet_type() {
            Some(PacketType::CarTelemetry) => (
                PacketType::CarTelemetry,
                map_participant(decode_telemetry(datagram), index, &self.profile.telemetry)?,
            ),
            Some(PacketType::CarStatus) => (
                PacketType::CarStatus,
                map_participant(decode_status(datagram), index, &self.profile.status)?,
            ),
            Some(PacketType::Motion) => (
                PacketType::Motion,
                map_participant(decode_motion(datagram), index, &self.profile.motion)?,
            ),
            _ => {
                return Ok(DispatchOutcome::Ignored {
                    packet_id: class.packet_id,
                });
            }
        };
        trace!(state = ?DispatchState::Mapped, %packet, values = values.len());

        let frames = values
            .iter()
            .map(|value| encode_frame(value.id, value.length, value.raw))
            .collect::<Result<Vec<_>, _>>()
            .map_err(DispatchError::Encode)?;
        Ok(DispatchOutcome::Frames { packet, frames })
    }

    /// Pull datagrams from `source` until it ends or `shutdown` is set.
    ///
    /// Per-datagram failures are counted and skipped. A sink failure drops
    /// the rest of that datagram's frames. Only a source failure ends the
    /// loop with an error.
    pub fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        shutdown: &AtomicBool,
    ) -> Result<(), RunError>
    where
        S: DatagramSource + ?Sized,
        K: FrameSink + ?Sized,
    {
        info!(profile = %self.profile.name, "dispatcher started");
        while !shutdown.load(Ordering::SeqCst) {
            let Some(datagram) = source.next_datagram()? else {
                break;
            };
            self.stats.datagrams += 1;

            match self.dispatch(datagram) {
                Ok(DispatchOutcome::Ignored { packet_id }) => {
                    trace!(packet_id, "unsupported packet ignored");
                    self.stats.ignored += 1;
                }
                Ok(DispatchOutcome::Frames { packet, frames }) => {
                    *self.stats.dispatched.entry(packet).or_default() += 1;
                    self.transmit(sink, &frames);
                }
                Err(err) => {
                    debug!(stage = ?err.stage(), %err, "datagram dropped");
                    *self.stats.failures.entry(err.kind().to_string()).or_default() += 1;
                }
            }
        }
        info!(
            datagrams = self.stats.datagrams,
            frames = self.stats.frames_sent,
            "dispatcher stopped"
        );
        Ok(())
    }

    fn transmit<K: FrameSink + ?Sized>(&mut self, sink: &mut K, frames: &[OutputFrame]) {
        trace!(state = ?DispatchState::Transmitting, frames = frames.len());
        for frame in frames {
            if let Err(err) = sink.send(frame) {
                warn!(%frame, %err, "transmit failed, dropping remaining frames");
                self.stats.transmit_errors += 1;
                return;
            }
            self.stats.frames_sent += 1;
        }
    }
}

fn map_participant<P>(
    decoded: Result<P, F1Error>,
    index: usize,
    rules: &[SignalRule<<P::Record as SignalSource>::Signal>],
) -> Result<Vec<MappedValue>, DispatchError>
where
    P: ParticipantPacket,
    P::Record: SignalSource,
{
    let packet = decoded.map_err(DispatchError::Decode)?;
    trace!(state = ?DispatchState::Decoded);
    let record = select_participant(packet, index).map_err(DispatchError::Select)?;
    trace!(state = ?DispatchState::Selected, index);
    map_record(&record, rules).map_err(DispatchError::Map)
}
