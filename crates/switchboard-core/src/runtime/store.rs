// switchboard-core/src/runtime/store.rs
// ============================================================================
// Module: Switchboard In-Memory Store
// Description: Insertion-ordered in-memory switch store.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! [`InMemorySwitchStore`] keeps switches in a map keyed by name and iterates
//! them in first-insertion order; overwriting a key keeps its original slot.
//! Clones share the same map, so several managers can be pointed at one
//! backend by handing each a clone.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::identifiers::SwitchName;
use crate::core::switch::Switch;
use crate::interfaces::StoreError;
use crate::interfaces::SwitchStore;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Map contents guarded by the store mutex.
#[derive(Debug, Default)]
struct StoreState {
    /// Sequence number handed to the next new key.
    next_slot: u64,
    /// Entries keyed by name, tagged with their insertion slot.
    entries: BTreeMap<SwitchName, (u64, Switch)>,
}

/// In-memory switch store for tests, demos, and single-process deployments.
#[derive(Debug, Default, Clone)]
pub struct InMemorySwitchStore {
    /// Store state protected by a mutex.
    state: Arc<Mutex<StoreState>>,
}

impl InMemorySwitchStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `switches`, keyed by their names.
    #[must_use]
    pub fn from_switches(switches: impl IntoIterator<Item = Switch>) -> Self {
        let mut state = StoreState::default();
        for switch in switches {
            state.insert(switch.name().clone(), switch);
        }
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Returns the number of stored switches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.entries.len())
    }

    /// Returns true when the store holds no switches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.entries.is_empty())
    }

    /// Locks the store state.
    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, StoreError> {
        self.state.lock().map_err(|_| StoreError::Store("switch store mutex poisoned".to_string()))
    }
}

impl StoreState {
    /// Inserts or replaces an entry, keeping the slot of an existing key.
    fn insert(&mut self, name: SwitchName, switch: Switch) {
        if let Some(entry) = self.entries.get_mut(&name) {
            entry.1 = switch;
            return;
        }
        let slot = self.next_slot;
        self.next_slot = self.next_slot.saturating_add(1);
        self.entries.insert(name, (slot, switch));
    }
}

impl SwitchStore for InMemorySwitchStore {
    fn get(&self, name: &SwitchName) -> Result<Option<Switch>, StoreError> {
        Ok(self.lock()?.entries.get(name).map(|(_, switch)| switch.clone()))
    }

    fn set(&self, name: &SwitchName, switch: Switch) -> Result<(), StoreError> {
        self.lock()?.insert(name.clone(), switch);
        Ok(())
    }

    fn delete(&self, name: &SwitchName) -> Result<Option<Switch>, StoreError> {
        Ok(self.lock()?.entries.remove(name).map(|(_, switch)| switch))
    }

    fn entries(&self) -> Result<Vec<(SwitchName, Switch)>, StoreError> {
        let mut entries: Vec<(u64, SwitchName, Switch)> = {
            let guard = self.lock()?;
            guard
                .entries
                .iter()
                .map(|(name, (slot, switch))| (*slot, name.clone(), switch.clone()))
                .collect()
        };
        entries.sort_by_key(|(slot, _, _)| *slot);
        Ok(entries.into_iter().map(|(_, name, switch)| (name, switch)).collect())
    }
}
