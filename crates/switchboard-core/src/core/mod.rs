// switchboard-core/src/core/mod.rs
// ============================================================================
// Module: Switchboard Core Types
// Description: Switches, conditions, operators, inputs, and lifecycle events.
// Purpose: Provide the evaluation model independent of storage and delivery.
// Dependencies: serde, serde_json, sha2, smallvec, thiserror
// ============================================================================

//! ## Overview
//! Core types define what a switch is and how it decides. Nothing here owns
//! a registry; parents are resolved through a [`crate::interfaces::SwitchStore`]
//! handed in by the caller.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod condition;
pub mod events;
pub mod identifiers;
pub mod input;
pub mod operators;
pub mod switch;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::Argument;
pub use condition::Condition;
pub use condition::Operator;
pub use events::SwitchEvent;
pub use events::SwitchEventKind;
pub use events::SwitchEventRecord;
pub use identifiers::ManagerId;
pub use identifiers::SEPARATOR;
pub use identifiers::SwitchName;
pub use input::RequestInput;
pub use operators::BuiltinOperator;
pub use operators::OperatorError;
pub use switch::ChildNames;
pub use switch::EvaluationError;
pub use switch::MAX_LINEAGE_DEPTH;
pub use switch::Switch;
pub use switch::SwitchState;
