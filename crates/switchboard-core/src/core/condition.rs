// switchboard-core/src/core/condition.rs
// ============================================================================
// Module: Switch Conditions
// Description: Type-filtered predicates evaluated against request inputs.
// Purpose: Bind a typed argument accessor to an operator with optional negation.
// Dependencies: crate::core::input, serde_json
// ============================================================================

//! ## Overview
//! A [`Condition`] extracts a value from a request input through a named
//! [`Argument`] and asks an [`Operator`] whether the value satisfies it.
//! Arguments are bound to one concrete input type; inputs of any other type
//! evaluate to `false` regardless of negation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::input::RequestInput;

// ============================================================================
// SECTION: Operator Contract
// ============================================================================

/// Predicate applied to values extracted by an [`Argument`].
///
/// The `Display` form labels the operator in event logs.
pub trait Operator: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns true when the operator is satisfied by `value`.
    fn applies_to(&self, value: &Value) -> bool;
}

// ============================================================================
// SECTION: Argument
// ============================================================================

/// Type-erased accessor from a request input to a value.
type Accessor = dyn Fn(&RequestInput) -> Option<Value> + Send + Sync;

/// Named accessor bound to a specific input type.
///
/// # Invariants
/// - `accessor` returns `None` exactly when the input is not of `input_type`.
#[derive(Clone)]
pub struct Argument {
    /// Human-readable argument name.
    name: String,
    /// Concrete input type accepted by the accessor.
    input_type: &'static str,
    /// Accessor extracting the value from a matching input.
    accessor: Arc<Accessor>,
}

impl Argument {
    /// Creates an argument reading a value from inputs of type `I`.
    pub fn new<I, F>(name: impl Into<String>, accessor: F) -> Self
    where
        I: Any + Send + Sync,
        F: Fn(&I) -> Value + Send + Sync + 'static,
    {
        let accessor = move |input: &RequestInput| input.downcast_ref::<I>().map(&accessor);
        Self {
            name: name.into(),
            input_type: type_name::<I>(),
            accessor: Arc::new(accessor),
        }
    }

    /// Creates an argument resolving a JSON pointer against `serde_json::Value` inputs.
    ///
    /// Missing pointer targets resolve to `null`.
    pub fn json_pointer(pointer: impl Into<String>) -> Self {
        let pointer = pointer.into();
        let path = pointer.clone();
        Self::new::<Value, _>(pointer, move |document| {
            document.pointer(&path).cloned().unwrap_or(Value::Null)
        })
    }

    /// Returns the argument name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input type name the argument is bound to.
    #[must_use]
    pub const fn input_type(&self) -> &'static str {
        self.input_type
    }

    /// Extracts the argument value, or `None` when the input type does not match.
    #[must_use]
    pub fn extract(&self, input: &RequestInput) -> Option<Value> {
        (self.accessor)(input)
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("name", &self.name)
            .field("input_type", &self.input_type)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// SECTION: Condition
// ============================================================================

/// A single predicate contributing to a switch decision.
///
/// Equality is identity-based: clones of a condition compare equal, two
/// independently built conditions never do.
#[derive(Clone)]
pub struct Condition {
    /// Argument extracting the value under test.
    argument: Argument,
    /// Operator applied to the extracted value.
    operator: Arc<dyn Operator>,
    /// Inverts the operator result when set.
    negative: bool,
}

impl Condition {
    /// Creates a condition from an argument and an operator.
    pub fn new(argument: Argument, operator: impl Operator + 'static) -> Self {
        Self::from_shared(argument, Arc::new(operator))
    }

    /// Creates a condition from an argument and a shared operator.
    #[must_use]
    pub fn from_shared(argument: Argument, operator: Arc<dyn Operator>) -> Self {
        Self {
            argument,
            operator,
            negative: false,
        }
    }

    /// Returns the condition with negation set to `negative`.
    #[must_use]
    pub fn with_negative(mut self, negative: bool) -> Self {
        self.negative = negative;
        self
    }

    /// Sets the negation flag.
    pub fn set_negative(&mut self, negative: bool) {
        self.negative = negative;
    }

    /// Returns true when the operator result is inverted.
    #[must_use]
    pub const fn negative(&self) -> bool {
        self.negative
    }

    /// Returns the bound argument.
    #[must_use]
    pub const fn argument(&self) -> &Argument {
        &self.argument
    }

    /// Returns the operator.
    #[must_use]
    pub fn operator(&self) -> &dyn Operator {
        self.operator.as_ref()
    }

    /// Evaluates the condition against a single input.
    ///
    /// Inputs of the wrong type yield `false` without consulting the operator.
    #[must_use]
    pub fn evaluate(&self, input: &RequestInput) -> bool {
        let Some(value) = self.argument.extract(input) else {
            return false;
        };
        self.operator.applies_to(&value) != self.negative
    }

    /// Returns a short human-readable description for event logs.
    #[must_use]
    pub fn label(&self) -> String {
        let prefix = if self.negative { "not " } else { "" };
        format!("{prefix}{} {}", self.argument.name, self.operator)
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.negative == other.negative
            && same_allocation(&self.argument.accessor, &other.argument.accessor)
            && same_allocation(&self.operator, &other.operator)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("argument", &self.argument)
            .field("operator", &self.operator)
            .field("negative", &self.negative)
            .finish()
    }
}

/// Compares two shared trait objects by data address only.
fn same_allocation<T: ?Sized>(lhs: &Arc<T>, rhs: &Arc<T>) -> bool {
    Arc::as_ptr(lhs).cast::<()>() == Arc::as_ptr(rhs).cast::<()>()
}
