use std::path::Path;
use std::sync::atomic::AtomicBool;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::info;

use crate::dispatch::{Dispatcher, RunError};
use crate::sink::FrameSink;
use crate::source::{CaptureDatagramSource, CaptureStats, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, InputInfo, REPORT_VERSION, ReplayReport, ToolInfo};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

impl From<RunError> for ReplayError {
    fn from(value: RunError) -> Self {
        match value {
            RunError::Source(err) => ReplayError::Source(err),
        }
    }
}

/// Feed every game datagram in a capture through `dispatcher` into `sink`.
///
/// `port` restricts replay to datagrams sent to that UDP port; `None` takes
/// every UDP payload. The report carries the dispatcher's counters as they
/// stand after the capture ends.
pub fn replay_capture<K: FrameSink + ?Sized>(
    path: &Path,
    port: Option<u16>,
    dispatcher: &mut Dispatcher,
    sink: &mut K,
) -> Result<ReplayReport, ReplayError> {
    let mut source = CaptureDatagramSource::open(path)?;
    if let Some(port) = port {
        source = source.with_port(port);
    }

    let never = AtomicBool::new(false);
    dispatcher.run(&mut source, sink, &never)?;

    let capture = summarize(source.stats());
    info!(
        packets = capture.packets_total,
        datagrams = capture.datagrams,
        "capture replayed"
    );
    Ok(ReplayReport {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "f1can".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: capture
            .time_end
            .clone()
            .or_else(|| capture.time_start.clone())
            .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string()),
        input: InputInfo {
            path: path.display().to_string(),
            bytes: path.metadata()?.len(),
        },
        capture_summary: capture,
        profile: dispatcher.profile().name.clone(),
        dispatch: dispatcher.stats().clone(),
    })
}

fn summarize(stats: &CaptureStats) -> CaptureSummary {
    CaptureSummary {
        packets_total: stats.packets_total,
        datagrams: stats.datagrams,
        time_start: ts_to_rfc3339(stats.first_ts),
        time_end: ts_to_rfc3339(stats.last_ts),
    }
}

fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
