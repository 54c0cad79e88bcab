// switchboard-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for switchboard-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use switchboard_config::ConditionConfig;
use switchboard_config::ConfigError;
use switchboard_config::SwitchConfig;
use switchboard_config::SwitchboardConfig;
use switchboard_core::BuiltinOperator;
use switchboard_core::SwitchState;

/// Standard result type for config tests.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `SwitchboardConfig` without validation.
pub fn config_from_toml(toml_str: &str) -> Result<SwitchboardConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a switch definition with defaults and no conditions.
pub fn switch_named(name: &str) -> SwitchConfig {
    SwitchConfig {
        name: name.to_string(),
        state: SwitchState::Disabled,
        compounded: false,
        concent: true,
        description: None,
        conditions: Vec::new(),
    }
}

/// Returns a condition definition over `argument`.
pub fn condition(argument: &str, operator: BuiltinOperator) -> ConditionConfig {
    ConditionConfig {
        argument: argument.to_string(),
        operator,
        negative: false,
    }
}

/// Asserts that a result is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error '{message}' did not contain '{needle}'"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
