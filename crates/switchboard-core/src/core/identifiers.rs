// switchboard-core/src/core/identifiers.rs
// ============================================================================
// Module: Switchboard Identifiers
// Description: Canonical switch names and manager identities.
// Purpose: Provide strongly typed, serializable names with hierarchy helpers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Switch names are opaque strings whose `:`-separated segments encode the
//! position of a switch in the switch tree (`"movies:star_wars"` nests under
//! `"movies"`). Names are accepted verbatim. A name ending in a separator has
//! no parent; other empty segments are split like any other segment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Segment separator used in hierarchical switch names.
pub const SEPARATOR: char = ':';

// ============================================================================
// SECTION: Switch Name
// ============================================================================

/// Hierarchical switch name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwitchName(String);

impl SwitchName {
    /// Creates a new switch name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a switch name from any displayable value.
    #[must_use]
    pub fn from_display(value: &impl fmt::Display) -> Self {
        Self(value.to_string())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the `:`-separated segments of the name.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Returns the immediate parent name (all segments but the last).
    ///
    /// Returns `None` when the name has no separator or ends with one.
    #[must_use]
    pub fn parent_name(&self) -> Option<Self> {
        match self.0.rsplit_once(SEPARATOR) {
            Some((parent, last)) if !last.is_empty() => Some(Self::new(parent)),
            _ => None,
        }
    }

    /// Returns true when `self` nests anywhere below `ancestor`.
    #[must_use]
    pub fn is_descendant_of(&self, ancestor: &Self) -> bool {
        self.0
            .strip_prefix(ancestor.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// Returns true when `self` is an immediate child of `parent`.
    #[must_use]
    pub fn is_child_of(&self, parent: &Self) -> bool {
        self.parent_name().as_ref() == Some(parent)
    }
}

impl fmt::Display for SwitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SwitchName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SwitchName {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&Self> for SwitchName {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl AsRef<str> for SwitchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// SECTION: Manager Identity
// ============================================================================

/// Next manager identity handed out by [`ManagerId::next`].
static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a manager instance.
///
/// # Invariants
/// - Two managers constructed in the same process never share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerId(u64);

impl ManagerId {
    /// Allocates a fresh manager identity.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identity value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "manager-{}", self.0)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
