// switchboard-core/src/core/input.rs
// ============================================================================
// Module: Request Inputs
// Description: Type-erased request-scoped inputs for switch evaluation.
// Purpose: Carry heterogeneous inputs with a safe, reflection-free type check.
// Dependencies: std::any
// ============================================================================

//! ## Overview
//! A [`RequestInput`] wraps any `'static + Send + Sync` value (a user record, a
//! request descriptor, a JSON document) behind an `Arc<dyn Any>`. Conditions
//! recover the concrete type through [`RequestInput::downcast_ref`]; a mismatch
//! is an ordinary `None`, never an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// SECTION: Request Input
// ============================================================================

/// Request-scoped input consumed by conditions.
///
/// # Invariants
/// - `type_name` always names the concrete type stored in `value`.
#[derive(Clone)]
pub struct RequestInput {
    /// Type-erased input value.
    value: Arc<dyn Any + Send + Sync>,
    /// Concrete type name for diagnostics.
    type_name: &'static str,
}

impl RequestInput {
    /// Wraps a concrete value as a request input.
    #[must_use]
    pub fn new<I>(value: I) -> Self
    where
        I: Any + Send + Sync,
    {
        Self {
            value: Arc::new(value),
            type_name: type_name::<I>(),
        }
    }

    /// Returns the wrapped value when it is exactly of type `I`.
    #[must_use]
    pub fn downcast_ref<I: Any>(&self) -> Option<&I> {
        self.value.downcast_ref::<I>()
    }

    /// Returns true when the wrapped value is exactly of type `I`.
    #[must_use]
    pub fn is<I: Any>(&self) -> bool {
        self.value.is::<I>()
    }

    /// Returns the concrete type name of the wrapped value.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns true when both inputs share the same allocation.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for RequestInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestInput").field("type_name", &self.type_name).finish_non_exhaustive()
    }
}

impl From<&str> for RequestInput {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for RequestInput {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<serde_json::Value> for RequestInput {
    fn from(value: serde_json::Value) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
