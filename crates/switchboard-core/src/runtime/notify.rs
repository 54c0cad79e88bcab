// switchboard-core/src/runtime/notify.rs
// ============================================================================
// Module: Switch Event Sinks
// Description: Notification sinks for switch lifecycle events.
// Purpose: Emit structured JSON-line event logs without hard dependencies.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Sinks implementing [`SwitchNotifier`]. The stderr and file sinks write one
//! [`SwitchEventRecord`] per line as JSON so deployments can route switch
//! events into their own logging pipeline. Delivery failures are dropped;
//! a sink never fails the registry operation that produced the event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::events::SwitchEvent;
use crate::core::events::SwitchEventKind;
use crate::core::events::SwitchEventRecord;
use crate::interfaces::SharedNotifier;
use crate::interfaces::SwitchNotifier;

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl SwitchNotifier for NoopNotifier {
    fn notify(&self, _event: &SwitchEvent<'_>) {}
}

/// Sink that logs JSON lines to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl SwitchNotifier for StderrNotifier {
    fn notify(&self, event: &SwitchEvent<'_>) {
        if let Ok(payload) = serde_json::to_string(&event.record()) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Sink that logs JSON lines to a file.
#[derive(Debug)]
pub struct FileNotifier {
    /// File handle used for append-only logging.
    file: Mutex<File>,
}

impl FileNotifier {
    /// Opens the event log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl SwitchNotifier for FileNotifier {
    fn notify(&self, event: &SwitchEvent<'_>) {
        if let Ok(payload) = serde_json::to_string(&event.record())
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// Sink that keeps every event in memory.
///
/// Clones share the same buffer, so a clone handed to a manager can be
/// inspected through the original.
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    /// Recorded events in delivery order.
    records: Arc<Mutex<Vec<SwitchEventRecord>>>,
}

impl RecordingNotifier {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded events.
    #[must_use]
    pub fn records(&self) -> Vec<SwitchEventRecord> {
        self.records.lock().map(|records| records.clone()).unwrap_or_default()
    }

    /// Returns the recorded event kinds in delivery order.
    #[must_use]
    pub fn kinds(&self) -> Vec<SwitchEventKind> {
        self.records().into_iter().map(|record| record.event).collect()
    }

    /// Discards every recorded event.
    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl SwitchNotifier for RecordingNotifier {
    fn notify(&self, event: &SwitchEvent<'_>) {
        if let Ok(mut records) = self.records.lock() {
            records.push(event.record());
        }
    }
}

/// Sink that forwards every event to several sinks in order.
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    /// Downstream sinks.
    sinks: Vec<SharedNotifier>,
}

impl FanoutNotifier {
    /// Creates a fanout over `sinks`.
    #[must_use]
    pub fn new(sinks: Vec<SharedNotifier>) -> Self {
        Self {
            sinks,
        }
    }

    /// Adds a downstream sink.
    pub fn push(&mut self, sink: SharedNotifier) {
        self.sinks.push(sink);
    }

    /// Returns the number of downstream sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true when no downstream sink is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl SwitchNotifier for FanoutNotifier {
    fn notify(&self, event: &SwitchEvent<'_>) {
        for sink in &self.sinks {
            sink.notify(event);
        }
    }
}
