// switchboard-core/src/core/switch.rs
// ============================================================================
// Module: Switches
// Description: Named feature switches with conditions and a parent veto.
// Purpose: Decide whether a feature is active for a set of request inputs.
// Dependencies: crate::core, crate::interfaces, crate::runtime::manager, smallvec
// ============================================================================

//! ## Overview
//! A [`Switch`] owns an ordered list of [`Condition`]s and decides activation
//! for the request inputs it is given. Switches live in a tree derived from
//! their names; the tree is stored as names (never live references) and the
//! parent is resolved through a [`SwitchStore`] at evaluation time.
//!
//! Evaluation order:
//! 1. With `concent` set and a resolvable parent, a parent that evaluates
//!    `false` vetoes the child.
//! 2. Otherwise the switch's own conditions decide: any single
//!    (input, condition) pair suffices unless `compounded` requires all.
//!
//! The activation mode ([`SwitchState`]) is carried for callers but never
//! consulted during evaluation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::condition::Condition;
use crate::core::events::SwitchEvent;
use crate::core::events::SwitchEventKind;
use crate::core::identifiers::ManagerId;
use crate::core::identifiers::SwitchName;
use crate::core::input::RequestInput;
use crate::interfaces::StoreError;
use crate::interfaces::SwitchNotifier;
use crate::interfaces::SwitchStore;
use crate::runtime::manager::Manager;
use crate::runtime::manager::ManagerError;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum number of ancestors consulted during a single evaluation.
pub const MAX_LINEAGE_DEPTH: usize = 64;

/// Inline capacity for child name lists.
const INLINE_CHILDREN: usize = 4;

/// Child name list stored on each switch.
pub type ChildNames = SmallVec<[SwitchName; INLINE_CHILDREN]>;

/// Next switch instance handed out by [`Switch::new`].
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

// ============================================================================
// SECTION: Switch State
// ============================================================================

/// Activation mode label.
///
/// Informational only; evaluation never reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchState {
    /// Switch is off for everyone.
    #[default]
    Disabled,
    /// Switch is on for inputs matching its conditions.
    Selective,
    /// Switch is on for everyone.
    Global,
}

impl SwitchState {
    /// Returns a stable label for the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Selective => "selective",
            Self::Global => "global",
        }
    }
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while evaluating a switch against its lineage.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// Parent lookup failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Parent chain exceeded [`MAX_LINEAGE_DEPTH`].
    #[error("switch \"{name}\" exceeds the maximum lineage depth of {max_depth}")]
    LineageTooDeep {
        /// Switch at which the limit was hit.
        name: SwitchName,
        /// Configured depth limit.
        max_depth: usize,
    },
}

// ============================================================================
// SECTION: Switch
// ============================================================================

/// Named feature switch.
///
/// # Invariants
/// - `parent` and `children` are maintained by the owning manager and always
///   name switches stored under those keys at the time of the last write.
/// - `dirty` is set by renames and condition mutations, cleared by
///   [`Switch::mark_clean`] and by the manager update path.
/// - Clones share `instance`; the manager uses it to recognise the same
///   switch across renames.
#[derive(Clone)]
pub struct Switch {
    /// Process-unique identity preserved across clones.
    instance: u64,
    /// Unique registry key.
    name: SwitchName,
    /// Informational activation mode.
    state: SwitchState,
    /// Requires every (input, condition) pair to pass when set.
    compounded: bool,
    /// Lets the parent veto this switch when set.
    concent: bool,
    /// Optional free-form description.
    description: Option<String>,
    /// Ordered conditions.
    conditions: Vec<Condition>,
    /// Parent name, if the parent was registered.
    parent: Option<SwitchName>,
    /// Immediate child names.
    children: ChildNames,
    /// Manager this switch was registered with.
    manager: Option<ManagerId>,
    /// Registry key the switch was last written under.
    registered_as: Option<SwitchName>,
    /// Sink for condition events.
    notifier: Option<Arc<dyn SwitchNotifier>>,
    /// Unsaved-change marker.
    dirty: bool,
}

impl Switch {
    /// Creates a disabled, unregistered switch.
    #[must_use]
    pub fn new(name: impl Into<SwitchName>) -> Self {
        Self {
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            state: SwitchState::Disabled,
            compounded: false,
            concent: true,
            description: None,
            conditions: Vec::new(),
            parent: None,
            children: ChildNames::new(),
            manager: None,
            registered_as: None,
            notifier: None,
            dirty: false,
        }
    }

    /// Returns the switch with the given activation mode.
    #[must_use]
    pub fn with_state(mut self, state: SwitchState) -> Self {
        self.state = state;
        self
    }

    /// Returns the switch with the given compounding policy.
    #[must_use]
    pub fn with_compounded(mut self, compounded: bool) -> Self {
        self.compounded = compounded;
        self
    }

    /// Returns the switch with the given parent veto policy.
    #[must_use]
    pub fn with_concent(mut self, concent: bool) -> Self {
        self.concent = concent;
        self
    }

    /// Returns the switch with a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the switch linked to an explicit parent.
    ///
    /// Registration recomputes the parent from the name; this is for switches
    /// evaluated directly against a store.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<SwitchName>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Returns the switch reporting condition events to `notifier`.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn SwitchNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Returns the switch name.
    #[must_use]
    pub const fn name(&self) -> &SwitchName {
        &self.name
    }

    /// Renames the switch; marks it dirty only when the name changes.
    pub fn set_name(&mut self, name: impl Into<SwitchName>) {
        let name = name.into();
        if name != self.name {
            self.name = name;
            self.dirty = true;
        }
    }

    /// Returns the activation mode.
    #[must_use]
    pub const fn state(&self) -> SwitchState {
        self.state
    }

    /// Sets the activation mode.
    pub const fn set_state(&mut self, state: SwitchState) {
        self.state = state;
    }

    /// Returns true when every (input, condition) pair must pass.
    #[must_use]
    pub const fn compounded(&self) -> bool {
        self.compounded
    }

    /// Sets the compounding policy.
    pub const fn set_compounded(&mut self, compounded: bool) {
        self.compounded = compounded;
    }

    /// Returns true when the parent can veto this switch.
    #[must_use]
    pub const fn concent(&self) -> bool {
        self.concent
    }

    /// Sets the parent veto policy.
    pub const fn set_concent(&mut self, concent: bool) {
        self.concent = concent;
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Sets or clears the description.
    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// Returns the conditions in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Returns the parent name, if linked.
    #[must_use]
    pub const fn parent(&self) -> Option<&SwitchName> {
        self.parent.as_ref()
    }

    /// Returns the immediate child names.
    #[must_use]
    pub fn children(&self) -> &[SwitchName] {
        &self.children
    }

    /// Returns the owning manager identity.
    #[must_use]
    pub const fn manager(&self) -> Option<ManagerId> {
        self.manager
    }

    /// Returns true when the switch has unsaved changes.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the unsaved-change marker.
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Returns true when both values are clones of the same switch.
    #[must_use]
    pub const fn same_instance(&self, other: &Self) -> bool {
        self.instance == other.instance
    }

    /// Appends a condition and marks the switch dirty.
    pub fn add_condition(&mut self, condition: Condition) {
        self.conditions.push(condition);
        self.dirty = true;
        if let Some(notifier) = &self.notifier
            && let Some(added) = self.conditions.last()
        {
            notifier.notify(&SwitchEvent::with_condition(
                SwitchEventKind::ConditionAdded,
                self,
                added,
            ));
        }
    }

    /// Removes the first condition identical to `condition`.
    ///
    /// Returns `None` and leaves the switch untouched when no condition matches.
    pub fn remove_condition(&mut self, condition: &Condition) -> Option<Condition> {
        let index = self.conditions.iter().position(|candidate| candidate == condition)?;
        let removed = self.conditions.remove(index);
        self.dirty = true;
        if let Some(notifier) = &self.notifier {
            notifier.notify(&SwitchEvent::with_condition(
                SwitchEventKind::ConditionRemoved,
                self,
                &removed,
            ));
        }
        Some(removed)
    }

    /// Decides activation from this switch's own conditions only.
    ///
    /// No conditions or no inputs is always `false`.
    #[must_use]
    pub fn own_decision(&self, inputs: &[RequestInput]) -> bool {
        if self.conditions.is_empty() || inputs.is_empty() {
            return false;
        }
        let mut outcomes = inputs.iter().flat_map(|input| {
            self.conditions.iter().map(move |condition| condition.evaluate(input))
        });
        if self.compounded { outcomes.all(|passed| passed) } else { outcomes.any(|passed| passed) }
    }

    /// Decides activation for `inputs`, consulting the parent through `store`.
    ///
    /// A parent name that no longer resolves is treated as no parent.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when a parent lookup fails or the lineage
    /// exceeds [`MAX_LINEAGE_DEPTH`].
    pub fn enabled_for<S>(
        &self,
        inputs: &[RequestInput],
        store: &S,
    ) -> Result<bool, EvaluationError>
    where
        S: SwitchStore + ?Sized,
    {
        self.enabled_at_depth(inputs, store, 0)
    }

    /// Evaluates with the number of ancestors already visited.
    fn enabled_at_depth<S>(
        &self,
        inputs: &[RequestInput],
        store: &S,
        depth: usize,
    ) -> Result<bool, EvaluationError>
    where
        S: SwitchStore + ?Sized,
    {
        if self.concent
            && let Some(parent_name) = &self.parent
        {
            if depth >= MAX_LINEAGE_DEPTH {
                return Err(EvaluationError::LineageTooDeep {
                    name: self.name.clone(),
                    max_depth: MAX_LINEAGE_DEPTH,
                });
            }
            if let Some(parent) = store.get(parent_name)?
                && !parent.enabled_at_depth(inputs, store, depth + 1)?
            {
                return Ok(false);
            }
        }
        Ok(self.own_decision(inputs))
    }

    /// Persists pending changes through the owning manager.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::Detached`] when the switch was not registered
    /// with `manager`, or any error raised by [`Manager::update`].
    pub fn save<S: SwitchStore>(&mut self, manager: &mut Manager<S>) -> Result<(), ManagerError> {
        if self.manager != Some(manager.id()) {
            return Err(ManagerError::Detached {
                name: self.name.clone(),
            });
        }
        manager.update(self)
    }

    // ------------------------------------------------------------------------
    // Manager-maintained links
    // ------------------------------------------------------------------------

    /// Returns the key the switch was last written under.
    pub(crate) const fn registered_as(&self) -> Option<&SwitchName> {
        self.registered_as.as_ref()
    }

    /// Binds the switch to a manager and records its registry key.
    pub(crate) fn attach(
        &mut self,
        manager: ManagerId,
        notifier: Arc<dyn SwitchNotifier>,
        key: SwitchName,
    ) {
        self.manager = Some(manager);
        self.notifier = Some(notifier);
        self.registered_as = Some(key);
    }

    /// Replaces the parent link.
    pub(crate) fn set_parent(&mut self, parent: Option<SwitchName>) {
        self.parent = parent;
    }

    /// Replaces the child list.
    pub(crate) fn set_children(&mut self, children: ChildNames) {
        self.children = children;
    }

    /// Appends a child name when absent.
    pub(crate) fn push_child(&mut self, child: &SwitchName) {
        if !self.children.contains(child) {
            self.children.push(child.clone());
        }
    }

    /// Drops a child name.
    pub(crate) fn remove_child(&mut self, child: &SwitchName) {
        self.children.retain(|existing| existing != child);
    }
}

impl fmt::Debug for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("compounded", &self.compounded)
            .field("concent", &self.concent)
            .field("conditions", &self.conditions)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("manager", &self.manager)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
