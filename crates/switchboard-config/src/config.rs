// switchboard-config/src/config.rs
// ============================================================================
// Module: Switchboard Configuration
// Description: Configuration loading and validation for switch registries.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: switchboard-core, serde, toml, ron
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file (or RON, by `.ron` extension)
//! with strict size and path limits, then validated before any switch is
//! built. [`SwitchboardConfig::build_manager`] turns a validated config into
//! a [`Manager`] seeded with every declared switch.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use switchboard_core::Argument;
use switchboard_core::BuiltinOperator;
use switchboard_core::Condition;
use switchboard_core::FileNotifier;
use switchboard_core::Manager;
use switchboard_core::ManagerConfig;
use switchboard_core::ManagerError;
use switchboard_core::NoopNotifier;
use switchboard_core::SharedNotifier;
use switchboard_core::StderrNotifier;
use switchboard_core::Switch;
use switchboard_core::SwitchName;
use switchboard_core::SwitchState;
use switchboard_core::SwitchStore;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "switchboard.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "SWITCHBOARD_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum number of switch definitions.
pub(crate) const MAX_SWITCHES: usize = 4096;
/// Maximum number of conditions per switch definition.
pub(crate) const MAX_CONDITIONS_PER_SWITCH: usize = 64;

// ============================================================================
// SECTION: Configuration Model
// ============================================================================

/// Top-level switchboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    /// Manager behaviour.
    #[serde(default)]
    pub manager: ManagerSection,
    /// Event log sink.
    #[serde(default)]
    pub events: EventsConfig,
    /// Switch definitions in registration order.
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
}

/// `[manager]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerSection {
    /// Create unknown switches on lookup.
    #[serde(default)]
    pub autocreate: bool,
}

/// `[events]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Sink receiving switch lifecycle events.
    #[serde(default)]
    pub sink: EventSink,
    /// Log file path for the `file` sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Event sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSink {
    /// Discard events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to `events.path`.
    File,
}

/// One `[[switches]]` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Hierarchical switch name.
    pub name: String,
    /// Activation mode label.
    #[serde(default)]
    pub state: SwitchState,
    /// Require every condition to pass.
    #[serde(default)]
    pub compounded: bool,
    /// Let the parent veto this switch.
    #[serde(default = "default_concent")]
    pub concent: bool,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Conditions in evaluation order.
    #[serde(default)]
    pub conditions: Vec<ConditionConfig>,
}

/// One `[[switches.conditions]]` definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfig {
    /// JSON pointer into `serde_json::Value` request inputs.
    pub argument: String,
    /// Operator applied to the resolved value.
    pub operator: BuiltinOperator,
    /// Invert the operator result.
    #[serde(default)]
    pub negative: bool,
}

/// Default for [`SwitchConfig::concent`].
const fn default_concent() -> bool {
    true
}

// ============================================================================
// SECTION: Loading
// ============================================================================

impl SwitchboardConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// The path is `path`, else `SWITCHBOARD_CONFIG`, else `switchboard.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        if resolved.extension().is_some_and(|ext| ext == "ron") {
            Self::from_ron_str(content)
        } else {
            Self::from_toml_str(content)
        }
    }

    /// Parses and validates TOML configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates RON configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.events.validate()?;
        if self.switches.len() > MAX_SWITCHES {
            return Err(ConfigError::Invalid(format!(
                "too many switches: {} (max {MAX_SWITCHES})",
                self.switches.len()
            )));
        }
        let mut seen = BTreeSet::new();
        for switch in &self.switches {
            switch.validate()?;
            if !seen.insert(switch.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate switch name: {}",
                    switch.name
                )));
            }
        }
        Ok(())
    }

    /// Returns the manager configuration.
    #[must_use]
    pub const fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            autocreate: self.manager.autocreate,
        }
    }

    // ------------------------------------------------------------------------
    // Manager Seeding
    // ------------------------------------------------------------------------

    /// Builds a manager over `store` with the configured sink and switches.
    ///
    /// Switches are registered in file order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the config is invalid, the event log
    /// cannot be opened, or registration fails.
    pub fn build_manager<S: SwitchStore>(&self, store: S) -> Result<Manager<S>, ConfigError> {
        self.validate()?;
        let notifier = self.events.notifier()?;
        let mut manager = Manager::from_shared(store, notifier, self.manager_config())?;
        for definition in &self.switches {
            let mut switch = definition.build();
            manager.register(&mut switch)?;
        }
        Ok(manager)
    }
}

impl EventsConfig {
    /// Validates sink settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.sink, &self.path) {
            (EventSink::File, None) => {
                Err(ConfigError::Invalid("events.path is required for the file sink".to_string()))
            }
            (_, Some(path)) => validate_path_string("events.path", &path.to_string_lossy()),
            (_, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    fn notifier(&self) -> Result<SharedNotifier, ConfigError> {
        match (self.sink, &self.path) {
            (EventSink::None, _) => Ok(Arc::new(NoopNotifier)),
            (EventSink::Stderr, _) => Ok(Arc::new(StderrNotifier)),
            (EventSink::File, Some(path)) => FileNotifier::new(path)
                .map(|sink| Arc::new(sink) as SharedNotifier)
                .map_err(|err| ConfigError::Io(err.to_string())),
            (EventSink::File, None) => {
                Err(ConfigError::Invalid("events.path is required for the file sink".to_string()))
            }
        }
    }
}

impl SwitchConfig {
    /// Validates the definition.
    fn validate(&self) -> Result<(), ConfigError> {
        let name = SwitchName::new(self.name.as_str());
        if self.name.is_empty() {
            return Err(ConfigError::Invalid("switch name must be non-empty".to_string()));
        }
        if name.segments().any(str::is_empty) {
            return Err(ConfigError::Invalid(format!(
                "switch name has an empty segment: {}",
                self.name
            )));
        }
        if self.conditions.len() > MAX_CONDITIONS_PER_SWITCH {
            return Err(ConfigError::Invalid(format!(
                "switch {} has too many conditions (max {MAX_CONDITIONS_PER_SWITCH})",
                self.name
            )));
        }
        for (index, condition) in self.conditions.iter().enumerate() {
            condition.validate().map_err(|reason| {
                ConfigError::Invalid(format!(
                    "switch {} condition {index}: {reason}",
                    self.name
                ))
            })?;
        }
        Ok(())
    }

    /// Builds a clean, unregistered switch from the definition.
    #[must_use]
    pub fn build(&self) -> Switch {
        let mut switch = Switch::new(self.name.as_str())
            .with_state(self.state)
            .with_compounded(self.compounded)
            .with_concent(self.concent);
        if let Some(description) = &self.description {
            switch = switch.with_description(description.as_str());
        }
        for condition in &self.conditions {
            switch.add_condition(condition.build());
        }
        switch.mark_clean();
        switch
    }
}

impl ConditionConfig {
    /// Validates the argument pointer and operator parameters.
    fn validate(&self) -> Result<(), String> {
        validate_json_pointer(&self.argument)?;
        self.operator.validate().map_err(|err| err.to_string())
    }

    /// Builds the condition.
    #[must_use]
    pub fn build(&self) -> Condition {
        Condition::new(Argument::json_pointer(self.argument.as_str()), self.operator.clone())
            .with_negative(self.negative)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or opening the event log.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML or RON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Manager construction or switch registration failed.
    #[error(transparent)]
    Manager(#[from] ManagerError),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from an explicit argument or the environment.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_path_with(path, env::var(CONFIG_ENV_VAR).ok())
}

/// Picks the explicit path, then `env_path`, then the default file name.
fn resolve_path_with(
    path: Option<&Path>,
    env_path: Option<String>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates RFC 6901 pointer syntax.
fn validate_json_pointer(pointer: &str) -> Result<(), String> {
    if pointer.is_empty() {
        return Ok(());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(format!("argument must be a JSON pointer starting with '/': {pointer}"));
    };
    let mut chars = rest.chars();
    while let Some(ch) = chars.next() {
        if ch == '~' && !matches!(chars.next(), Some('0' | '1')) {
            return Err(format!("argument has an invalid '~' escape: {pointer}"));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
