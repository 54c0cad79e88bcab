// switchboard-core/src/runtime/manager.rs
// ============================================================================
// Module: Switch Manager
// Description: Registry of switches over an injected store and notifier.
// Purpose: Maintain the name-derived switch tree and answer activation queries.
// Dependencies: crate::{core, interfaces}, thiserror
// ============================================================================

//! ## Overview
//! The [`Manager`] is the single writer of its registry: every mutation takes
//! `&mut self`, so tree maintenance (parent links, child lists, subtree
//! removal) is never observed half-done. Storage and notification are
//! injected collaborators; storage errors propagate unchanged.
//!
//! Tree maintenance keys everything by name:
//! - a switch's parent is the registered switch named by all but its last
//!   `:` segment;
//! - a parent's children are the registered switches one segment below it.
//!
//! Registration order does not matter: a parent registered after its
//! children adopts them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use thiserror::Error;

use crate::core::events::SwitchEvent;
use crate::core::events::SwitchEventKind;
use crate::core::identifiers::ManagerId;
use crate::core::identifiers::SwitchName;
use crate::core::input::RequestInput;
use crate::core::switch::ChildNames;
use crate::core::switch::EvaluationError;
use crate::core::switch::Switch;
use crate::interfaces::SharedNotifier;
use crate::interfaces::StoreError;
use crate::interfaces::SwitchNotifier;
use crate::interfaces::SwitchStore;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Manager configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Create and register unknown switches on lookup instead of failing.
    pub autocreate: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Manager errors.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// The requested switch is not registered.
    #[error("no switch named \"{name}\" is registered")]
    NotFound {
        /// Requested switch name.
        name: SwitchName,
    },
    /// The switch was not registered with this manager.
    #[error("switch \"{name}\" is not registered with this manager")]
    Detached {
        /// Switch name.
        name: SwitchName,
    },
    /// Storage collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Evaluation failed.
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

// ============================================================================
// SECTION: Manager
// ============================================================================

/// Switch registry and activation query surface.
pub struct Manager<S> {
    /// Process-unique manager identity.
    id: ManagerId,
    /// Storage collaborator.
    store: S,
    /// Notification collaborator.
    notifier: SharedNotifier,
    /// Request inputs used by [`Manager::active`].
    inputs: Vec<RequestInput>,
    /// Manager configuration.
    config: ManagerConfig,
}

impl<S: SwitchStore> Manager<S> {
    /// Creates a manager with default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when relinking stored switches fails.
    pub fn new(store: S, notifier: impl SwitchNotifier + 'static) -> Result<Self, ManagerError> {
        Self::with_config(store, notifier, ManagerConfig::default())
    }

    /// Creates a manager with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when relinking stored switches fails.
    pub fn with_config(
        store: S,
        notifier: impl SwitchNotifier + 'static,
        config: ManagerConfig,
    ) -> Result<Self, ManagerError> {
        Self::from_shared(store, Arc::new(notifier), config)
    }

    /// Creates a manager over an already shared notifier.
    ///
    /// Switches already in `store` are relinked from their names and bound
    /// to this manager; no events are emitted.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when relinking stored switches fails.
    pub fn from_shared(
        store: S,
        notifier: SharedNotifier,
        config: ManagerConfig,
    ) -> Result<Self, ManagerError> {
        let manager = Self {
            id: ManagerId::next(),
            store,
            notifier,
            inputs: Vec::new(),
            config,
        };
        manager.relink()?;
        Ok(manager)
    }

    /// Returns the manager identity.
    #[must_use]
    pub const fn id(&self) -> ManagerId {
        self.id
    }

    /// Returns the storage collaborator.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the shared notifier.
    #[must_use]
    pub fn notifier(&self) -> SharedNotifier {
        Arc::clone(&self.notifier)
    }

    /// Returns true when unknown switches are created on lookup.
    #[must_use]
    pub const fn autocreate(&self) -> bool {
        self.config.autocreate
    }

    /// Enables or disables autocreation.
    pub const fn set_autocreate(&mut self, autocreate: bool) {
        self.config.autocreate = autocreate;
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Returns every registered switch in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when listing fails.
    pub fn switches(&self) -> Result<Vec<Switch>, ManagerError> {
        Ok(self.store.list()?)
    }

    /// Returns every registered name in storage order.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when listing fails.
    pub fn switch_names(&self) -> Result<Vec<SwitchName>, ManagerError> {
        Ok(self.store.names()?)
    }

    /// Looks up a registered switch.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] when no switch is registered under
    /// `name`.
    pub fn switch(&self, name: impl Into<SwitchName>) -> Result<Switch, ManagerError> {
        let name = name.into();
        self.store.get(&name)?.ok_or(ManagerError::NotFound {
            name,
        })
    }

    /// Returns the registered children of `name` in child-list order.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] when `name` is not registered.
    pub fn children_of(&self, name: impl Into<SwitchName>) -> Result<Vec<Switch>, ManagerError> {
        let parent = self.switch(name)?;
        let mut children = Vec::with_capacity(parent.children().len());
        for child in parent.children() {
            if let Some(switch) = self.store.get(child)? {
                children.push(switch);
            }
        }
        Ok(children)
    }

    /// Decides whether `name` is active for the current request inputs.
    ///
    /// With autocreation enabled, an unknown name is registered as a new
    /// disabled switch and reported inactive.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotFound`] for unknown names without
    /// autocreation, or any storage and evaluation failure.
    pub fn active(&mut self, name: impl Into<SwitchName>) -> Result<bool, ManagerError> {
        let name = name.into();
        match self.store.get(&name)? {
            Some(switch) => Ok(switch.enabled_for(&self.inputs, &self.store)?),
            None if self.config.autocreate => {
                let mut switch = Switch::new(name);
                self.register(&mut switch)?;
                Ok(false)
            }
            None => Err(ManagerError::NotFound {
                name,
            }),
        }
    }

    // ------------------------------------------------------------------------
    // Request inputs
    // ------------------------------------------------------------------------

    /// Appends request inputs.
    pub fn input<I>(&mut self, inputs: impl IntoIterator<Item = I>)
    where
        I: Into<RequestInput>,
    {
        self.inputs.extend(inputs.into_iter().map(Into::into));
    }

    /// Returns the current request inputs.
    #[must_use]
    pub fn inputs(&self) -> &[RequestInput] {
        &self.inputs
    }

    /// Clears the request inputs.
    pub fn flush(&mut self) {
        self.inputs.clear();
    }

    // ------------------------------------------------------------------------
    // Registry mutations
    // ------------------------------------------------------------------------

    /// Registers a switch and emits [`SwitchEventKind::Registered`].
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when storage fails.
    pub fn register(&mut self, switch: &mut Switch) -> Result<(), ManagerError> {
        self.register_with(switch, SwitchEventKind::Registered)
    }

    /// Persists a switch through the update path.
    ///
    /// Clears the dirty marker, re-registers the switch, and emits
    /// [`SwitchEventKind::Updated`].
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when storage fails.
    pub fn update(&mut self, switch: &mut Switch) -> Result<(), ManagerError> {
        switch.mark_clean();
        self.register_with(switch, SwitchEventKind::Updated)
    }

    /// Registers a switch and emits `signal`.
    ///
    /// Writes the switch under its name (overwriting any entry), binds it to
    /// this manager, and repairs the tree around it: the parent gains this
    /// name as a child, stored switches one segment below adopt it as their
    /// parent, and a rename drops the old key. A rename whose old key now
    /// holds a different switch leaves that key and its links untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when storage fails.
    pub fn register_with(
        &mut self,
        switch: &mut Switch,
        signal: SwitchEventKind,
    ) -> Result<(), ManagerError> {
        let name = switch.name().clone();
        let previous = switch.registered_as().cloned().unwrap_or_else(|| name.clone());
        let renamed = previous != name;

        // Old links come from storage; the caller's copy may predate adoptions.
        let stored = self.store.get(&previous)?.filter(|entry| entry.same_instance(switch));
        if renamed && stored.is_some() {
            self.store.delete(&previous)?;
        }

        let entries = self.store.entries()?;
        let keys: BTreeSet<&SwitchName> = entries.iter().map(|(key, _)| key).collect();
        let parent = name.parent_name().filter(|candidate| keys.contains(candidate));

        let mut children = ChildNames::new();
        if let Some(stored) = &stored {
            if let Some(old_parent) = stored.parent()
                && (renamed || parent.as_ref() != Some(old_parent))
            {
                self.edit(old_parent, |entry| entry.remove_child(&previous))?;
            }
            for child in stored.children() {
                if child.is_child_of(&name) && keys.contains(child) {
                    children.push(child.clone());
                } else {
                    self.edit(child, |entry| {
                        if entry.parent() == Some(&previous) {
                            entry.set_parent(None);
                        }
                    })?;
                }
            }
        }
        if let Some(parent) = &parent {
            self.edit(parent, |entry| entry.push_child(&name))?;
        }
        for (key, _) in &entries {
            if key.is_child_of(&name) && !children.contains(key) {
                children.push(key.clone());
            }
        }
        for child in &children {
            self.edit(child, |entry| {
                if entry.parent() != Some(&name) {
                    entry.set_parent(Some(name.clone()));
                }
            })?;
        }

        switch.set_parent(parent);
        switch.set_children(children);
        switch.attach(self.id, Arc::clone(&self.notifier), name.clone());
        self.store.set(&name, switch.clone())?;
        self.notifier.notify(&SwitchEvent::new(signal, switch));
        Ok(())
    }

    /// Removes `name` and every switch nested below it.
    ///
    /// Emits [`SwitchEventKind::Unregistered`] per removed switch and returns
    /// the removed switches. Unknown names remove nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Store`] when storage fails.
    pub fn unregister(&mut self, name: impl Into<SwitchName>) -> Result<Vec<Switch>, ManagerError> {
        let root = name.into();
        let doomed: Vec<SwitchName> = self
            .store
            .names()?
            .into_iter()
            .filter(|key| *key == root || key.is_descendant_of(&root))
            .collect();

        let mut removed = Vec::with_capacity(doomed.len());
        for key in &doomed {
            if let Some(switch) = self.store.delete(key)? {
                removed.push(switch);
            }
        }
        if let Some(parent) = root.parent_name() {
            self.edit(&parent, |entry| entry.remove_child(&root))?;
        }
        for switch in &removed {
            self.notifier.notify(&SwitchEvent::new(SwitchEventKind::Unregistered, switch));
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------------
    // Tree maintenance
    // ------------------------------------------------------------------------

    /// Loads, mutates, and stores the entry under `name` when present.
    fn edit(&self, name: &SwitchName, apply: impl FnOnce(&mut Switch)) -> Result<(), StoreError> {
        if let Some(mut entry) = self.store.get(name)? {
            apply(&mut entry);
            self.store.set(name, entry)?;
        }
        Ok(())
    }

    /// Recomputes every stored switch's links from names and binds it here.
    fn relink(&self) -> Result<(), StoreError> {
        let entries = self.store.entries()?;
        let keys: BTreeSet<&SwitchName> = entries.iter().map(|(key, _)| key).collect();
        for (key, switch) in &entries {
            let mut switch = switch.clone();
            let parent = key.parent_name().filter(|candidate| keys.contains(candidate));
            let children: ChildNames = entries
                .iter()
                .filter(|(candidate, _)| candidate.is_child_of(key))
                .map(|(candidate, _)| candidate.clone())
                .collect();
            switch.set_parent(parent);
            switch.set_children(children);
            switch.attach(self.id, Arc::clone(&self.notifier), key.clone());
            self.store.set(key, switch)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
