// switchboard-core/src/core/events.rs
// ============================================================================
// Module: Switch Lifecycle Events
// Description: Event kinds and payloads emitted to notification sinks.
// Purpose: Describe registry and condition mutations in a fixed vocabulary.
// Dependencies: crate::core::{condition, identifiers, switch}, serde
// ============================================================================

//! ## Overview
//! Every registry mutation (register, unregister, update) and every condition
//! mutation (add, remove) produces a [`SwitchEvent`]. Sinks receive the event by
//! reference; sinks that persist events convert them into the serializable
//! [`SwitchEventRecord`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;

use crate::core::condition::Condition;
use crate::core::identifiers::SwitchName;
use crate::core::switch::Switch;
use crate::core::switch::SwitchState;

// ============================================================================
// SECTION: Event Kinds
// ============================================================================

/// Lifecycle event kinds.
///
/// # Invariants
/// - Variants are stable for event log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchEventKind {
    /// A switch was written to the registry.
    Registered,
    /// A switch was removed from the registry.
    Unregistered,
    /// A switch was persisted through the update path.
    Updated,
    /// A condition was appended to a switch.
    ConditionAdded,
    /// A condition was removed from a switch.
    ConditionRemoved,
}

impl SwitchEventKind {
    /// Returns a stable label for the event kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "switch_registered",
            Self::Unregistered => "switch_unregistered",
            Self::Updated => "switch_updated",
            Self::ConditionAdded => "switch_condition_added",
            Self::ConditionRemoved => "switch_condition_removed",
        }
    }
}

impl fmt::Display for SwitchEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Event Payloads
// ============================================================================

/// Borrowed lifecycle event handed to notification sinks.
#[derive(Clone, Copy)]
pub struct SwitchEvent<'a> {
    /// Event kind.
    pub kind: SwitchEventKind,
    /// Switch the event concerns.
    pub switch: &'a Switch,
    /// Condition involved in condition events.
    pub condition: Option<&'a Condition>,
}

impl<'a> SwitchEvent<'a> {
    /// Creates a registry event.
    #[must_use]
    pub const fn new(kind: SwitchEventKind, switch: &'a Switch) -> Self {
        Self {
            kind,
            switch,
            condition: None,
        }
    }

    /// Creates a condition event.
    #[must_use]
    pub const fn with_condition(
        kind: SwitchEventKind,
        switch: &'a Switch,
        condition: &'a Condition,
    ) -> Self {
        Self {
            kind,
            switch,
            condition: Some(condition),
        }
    }

    /// Converts the event into a timestamped, serializable record.
    #[must_use]
    pub fn record(&self) -> SwitchEventRecord {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        SwitchEventRecord {
            event: self.kind,
            timestamp_ms,
            switch: self.switch.name().clone(),
            state: self.switch.state(),
            condition: self.condition.map(Condition::label),
        }
    }
}

/// Serializable lifecycle event record for structured event logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchEventRecord {
    /// Event kind.
    pub event: SwitchEventKind,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Switch name at the time of the event.
    pub switch: SwitchName,
    /// Switch activation mode at the time of the event.
    pub state: SwitchState,
    /// Condition label for condition events.
    pub condition: Option<String>,
}
