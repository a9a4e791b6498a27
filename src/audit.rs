use chrono::{SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::models::{ErrorEvent, ErrorKind};

/// Sink for failed-request events. Implementations stamp the time themselves.
pub trait ErrorLog: Send + Sync {
    fn record(&self, level: &str, message: &str);

    /// Records a categorized event; sinks that only keep text get the message.
    fn record_event(&self, level: &str, event: &ErrorEvent) {
        self.record(level, &event.message);
    }
}

/// Forwards events to the process-wide tracing subscriber.
#[derive(Debug, Default)]
pub struct TracingLog;

impl ErrorLog for TracingLog {
    fn record(&self, level: &str, message: &str) {
        emit(level, None, message);
    }

    fn record_event(&self, level: &str, event: &ErrorEvent) {
        emit(level, Some(event.kind), &event.message);
    }
}

/// Appends one line per event to a log file, and mirrors it to tracing.
pub struct FileLog {
    file: Mutex<File>,
}

impl FileLog {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl FileLog {
    fn append(&self, level: &str, kind: Option<ErrorKind>, message: &str) {
        emit(level, kind, message);

        let line = format_line(
            &Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            kind,
            message,
        );
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = file.write_all(line.as_bytes()) {
            tracing::warn!("failed to write error log: {}", e);
        }
    }
}

impl ErrorLog for FileLog {
    fn record(&self, level: &str, message: &str) {
        self.append(level, None, message);
    }

    fn record_event(&self, level: &str, event: &ErrorEvent) {
        self.append(level, Some(event.kind), &event.message);
    }
}

fn format_line(timestamp: &str, level: &str, kind: Option<ErrorKind>, message: &str) -> String {
    // keep one event per line
    let message = message.replace(['\r', '\n'], " ");
    match kind {
        Some(kind) => format!("{} [{}] [{:?}] {}\n", timestamp, level, kind, message),
        None => format!("{} [{}] {}\n", timestamp, level, message),
    }
}

fn emit(level: &str, kind: Option<ErrorKind>, message: &str) {
    let kind = kind.map(|k| format!("{:?}", k)).unwrap_or_default();
    match level {
        "ERROR" => tracing::error!(target: "rsa_endpoint::audit", kind = %kind, "{}", message),
        "WARN" => tracing::warn!(target: "rsa_endpoint::audit", kind = %kind, "{}", message),
        _ => tracing::info!(target: "rsa_endpoint::audit", severity = level, kind = %kind, "{}", message),
    }
}
