// switchboard-core/src/lib.rs
// ============================================================================
// Module: Switchboard Core Library
// Description: Public API surface for the switchboard feature-switch engine.
// Purpose: Expose core types, collaborator interfaces, and the manager.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Switchboard decides at runtime whether a named feature is active for a
//! given request. Switches carry conditions evaluated against request
//! inputs, nest under one another through `:`-separated names, and live in a
//! manager backed by injected storage and notification collaborators.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::SharedNotifier;
pub use interfaces::StoreError;
pub use interfaces::SwitchNotifier;
pub use interfaces::SwitchStore;
pub use runtime::FanoutNotifier;
pub use runtime::FileNotifier;
pub use runtime::InMemorySwitchStore;
pub use runtime::Manager;
pub use runtime::ManagerConfig;
pub use runtime::ManagerError;
pub use runtime::NoopNotifier;
pub use runtime::RecordingNotifier;
pub use runtime::StderrNotifier;
