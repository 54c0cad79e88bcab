// switchboard-core/src/interfaces/mod.rs
// ============================================================================
// Module: Switchboard Interfaces
// Description: Backend-agnostic contracts for switch storage and notification.
// Purpose: Define the collaborator surfaces injected into the manager.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The manager never owns a concrete backend. Storage is any [`SwitchStore`]
//! (a name-keyed map with ordered iteration) and notification is any
//! [`SwitchNotifier`] (a fire-and-forget event sink). Both take `&self`;
//! implementations provide their own interior mutability.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::events::SwitchEvent;
use crate::core::identifiers::SwitchName;
use crate::core::switch::Switch;

// ============================================================================
// SECTION: Switch Store
// ============================================================================

/// Switch store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("switch store io error: {0}")]
    Io(String),
    /// Stored data is corrupted or unreadable.
    #[error("switch store corruption: {0}")]
    Corrupt(String),
    /// Store reported an error.
    #[error("switch store error: {0}")]
    Store(String),
}

/// Name-keyed switch storage with a stable iteration order.
pub trait SwitchStore {
    /// Loads the switch stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, name: &SwitchName) -> Result<Option<Switch>, StoreError>;

    /// Stores `switch` under `name`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn set(&self, name: &SwitchName, switch: Switch) -> Result<(), StoreError>;

    /// Deletes the entry under `name`, returning it when present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&self, name: &SwitchName) -> Result<Option<Switch>, StoreError>;

    /// Returns every `(key, switch)` pair in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn entries(&self) -> Result<Vec<(SwitchName, Switch)>, StoreError>;

    /// Returns every stored switch in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&self) -> Result<Vec<Switch>, StoreError> {
        Ok(self.entries()?.into_iter().map(|(_, switch)| switch).collect())
    }

    /// Returns every stored key in iteration order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn names(&self) -> Result<Vec<SwitchName>, StoreError> {
        Ok(self.entries()?.into_iter().map(|(name, _)| name).collect())
    }
}

// ============================================================================
// SECTION: Switch Notifier
// ============================================================================

/// Sink for switch lifecycle events.
///
/// Sinks must not fail the operation that produced the event; delivery
/// problems are the sink's own concern.
pub trait SwitchNotifier: Send + Sync {
    /// Receives a lifecycle event.
    fn notify(&self, event: &SwitchEvent<'_>);
}

/// Shared notifier handle held by the manager and its switches.
pub type SharedNotifier = Arc<dyn SwitchNotifier>;
