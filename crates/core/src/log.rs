//! Per-build console log
//!
//! Every build owns a [`BuildLog`]. Steps that run inside the build
//! (archiving, retention before start) write human-readable lines here;
//! each line is also mirrored to `tracing` so the host process sees it.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a console line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogLevel {
    /// Progress information
    Info,
    /// Something looks wrong but the build continues unchanged
    Warn,
    /// An error the build reports
    Error,
}

/// One console line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Severity
    pub level: LogLevel,
    /// Message text
    pub message: String,
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.level {
            LogLevel::Info => write!(f, "{}", self.message),
            LogLevel::Warn => write!(f, "WARN: {}", self.message),
            LogLevel::Error => write!(f, "ERROR: {}", self.message),
        }
    }
}

/// Append-only console log of a build
#[derive(Debug)]
pub struct BuildLog {
    /// Build display name used as the `tracing` field
    name: String,
    lines: Mutex<Vec<LogLine>>,
}

impl BuildLog {
    /// Create an empty log for the named build
    pub fn new(name: impl Into<String>) -> Self {
        BuildLog {
            name: name.into(),
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Append an informational line
    pub fn info(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(build = %self.name, "{}", message);
        self.push(LogLevel::Info, message);
    }

    /// Append a warning
    pub fn warn(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(build = %self.name, "{}", message);
        self.push(LogLevel::Warn, message);
    }

    /// Append an error
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(build = %self.name, "{}", message);
        self.push(LogLevel::Error, message);
    }

    fn push(&self, level: LogLevel, message: String) {
        self.lines.lock().push(LogLine { level, message });
    }

    /// Copy of all lines so far
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    /// Whether any line at `level` contains `needle`
    pub fn contains(&self, level: LogLevel, needle: &str) -> bool {
        self.lines
            .lock()
            .iter()
            .any(|l| l.level == level && l.message.contains(needle))
    }

    /// Whole log rendered as text, one line per entry
    pub fn render(&self) -> String {
        let lines = self.lines.lock();
        let mut out = String::new();
        for line in lines.iter() {
            out.push_str(&line.to_string());
            out.push('\n');
        }
        out
    }
}
