// switchboard-core/src/runtime/mod.rs
// ============================================================================
// Module: Switchboard Runtime
// Description: Manager, in-memory store, and notification sinks.
// Purpose: Run switch registries over injected collaborators.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules own registry state: the [`Manager`] and the stock
//! implementations of the storage and notification interfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod manager;
pub mod notify;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use manager::Manager;
pub use manager::ManagerConfig;
pub use manager::ManagerError;
pub use notify::FanoutNotifier;
pub use notify::FileNotifier;
pub use notify::NoopNotifier;
pub use notify::RecordingNotifier;
pub use notify::StderrNotifier;
pub use store::InMemorySwitchStore;
