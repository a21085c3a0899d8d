//! Outbound report surface.

use chrono::{DateTime, Utc};
use facegate_core::{DoorState, LogKind};
use std::sync::Mutex;
use tracing::debug;

/// A log entry as handed to the remote channel.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LogReport {
    #[serde(rename = "type")]
    pub kind: LogKind,
    pub msg: String,
    pub at: DateTime<Utc>,
}

/// Outbound surface of the remote channel.
///
/// Both calls are fire-and-forget: implementations swallow delivery
/// failures (logging them at most), because a disconnected channel must
/// never affect local door operation.
pub trait RemoteSink: Send + Sync {
    /// Report the current door state.
    fn report_door_status(&self, state: DoorState);

    /// Report a categorized log message.
    fn report_log(&self, kind: LogKind, message: &str);
}

/// Sink that drops every report; used when no remote channel is
/// configured.
#[derive(Debug, Default)]
pub struct NullSink;

impl RemoteSink for NullSink {
    fn report_door_status(&self, state: DoorState) {
        debug!(state = %state, "door status (no remote channel)");
    }

    fn report_log(&self, kind: LogKind, message: &str) {
        debug!(kind = %kind, message, "log report (no remote channel)");
    }
}

/// Sink that records every report; used by tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    statuses: Mutex<Vec<DoorState>>,
    logs: Mutex<Vec<LogReport>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<DoorState> {
        self.statuses.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn logs(&self) -> Vec<LogReport> {
        self.logs.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Logs of one kind, messages only.
    pub fn logs_of(&self, kind: LogKind) -> Vec<String> {
        self.logs()
            .into_iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.msg)
            .collect()
    }
}

impl RemoteSink for RecordingSink {
    fn report_door_status(&self, state: DoorState) {
        if let Ok(mut statuses) = self.statuses.lock() {
            statuses.push(state);
        }
    }

    fn report_log(&self, kind: LogKind, message: &str) {
        if let Ok(mut logs) = self.logs.lock() {
            logs.push(LogReport {
                kind,
                msg: message.to_string(),
                at: Utc::now(),
            });
        }
    }
}
