//! Diagnostic side channel for advisory decoder warnings.
//!
//! Warnings never change whether a decode succeeds. They are raised for
//! unrecognized top-level message kinds and for bytes skipped while scanning
//! C-strings.

use std::sync::Mutex;
use tracing::warn;

/// Write-only receiver of human-readable warning lines.
pub trait DiagnosticSink {
    fn warn(&self, message: &str);
}

impl<T: DiagnosticSink + ?Sized> DiagnosticSink for &T {
    fn warn(&self, message: &str) {
        (**self).warn(message)
    }
}

/// Forwards every warning to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        warn!(target: "pgoutput_decoder::diagnostics", "{}", message);
    }
}

/// Keeps warnings in memory so callers can inspect them after a decode.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(
            &mut *self
                .lines
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl DiagnosticSink for RecordingSink {
    fn warn(&self, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}
