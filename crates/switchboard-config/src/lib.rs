// switchboard-config/src/lib.rs
// ============================================================================
// Module: Switchboard Config Library
// Description: Declarative switch definitions, validation, and manager seeding.
// Purpose: Single source of truth for switchboard.toml semantics.
// Dependencies: switchboard-core, serde, toml, ron
// ============================================================================

//! ## Overview
//! `switchboard-config` defines the declarative configuration model for a
//! switch registry. Configuration is validated fail-closed before any switch
//! is built, and a valid configuration seeds a
//! [`switchboard_core::Manager`] over any store.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
