// switchboard-core/tests/support/fixtures.rs
// ============================================================================
// Module: Test Fixtures
// Description: Input types, arguments, and operators shared by switch tests.
// ============================================================================
//! ## Overview
//! Two unrelated input types (`User`, `Request`) exercise the type filter;
//! [`Fixed`] is an operator with a predetermined answer.

#![allow(dead_code, reason = "Not every test binary uses every fixture.")]

use std::fmt;

use serde_json::Value;
use serde_json::json;
use switchboard_core::Argument;
use switchboard_core::BuiltinOperator;
use switchboard_core::Condition;
use switchboard_core::InMemorySwitchStore;
use switchboard_core::Manager;
use switchboard_core::ManagerConfig;
use switchboard_core::ManagerError;
use switchboard_core::Operator;
use switchboard_core::RecordingNotifier;
use switchboard_core::RequestInput;

/// User record input.
#[derive(Debug, Clone)]
pub struct User {
    /// Display name.
    pub name: String,
    /// Age in years.
    pub age: u64,
}

/// HTTP request input.
#[derive(Debug, Clone)]
pub struct Request {
    /// Request path.
    pub path: String,
}

/// Wraps a user as a request input.
pub fn user(name: &str, age: u64) -> RequestInput {
    RequestInput::new(User {
        name: name.to_string(),
        age,
    })
}

/// Wraps a request as a request input.
pub fn request(path: &str) -> RequestInput {
    RequestInput::new(Request {
        path: path.to_string(),
    })
}

/// Argument reading the user's age.
pub fn age() -> Argument {
    Argument::new::<User, _>("user.age", |user| json!(user.age))
}

/// Argument reading the user's name.
pub fn user_name() -> Argument {
    Argument::new::<User, _>("user.name", |user| json!(user.name))
}

/// Argument reading the request path.
pub fn path() -> Argument {
    Argument::new::<Request, _>("request.path", |request| json!(request.path))
}

/// Condition passing for users strictly older than `years`.
pub fn older_than(years: u64) -> Condition {
    Condition::new(
        age(),
        BuiltinOperator::MoreThan {
            value: json!(years),
        },
    )
}

/// Condition passing for requests to exactly `expected`.
pub fn path_is(expected: &str) -> Condition {
    Condition::new(
        path(),
        BuiltinOperator::Equals {
            value: json!(expected),
        },
    )
}

/// Operator with a predetermined answer.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub bool);

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "is always {}", self.0)
    }
}

impl Operator for Fixed {
    fn applies_to(&self, _value: &Value) -> bool {
        self.0
    }
}

/// Condition on `User` inputs with a predetermined answer.
pub fn fixed(answer: bool) -> Condition {
    Condition::new(age(), Fixed(answer))
}

/// Manager over a fresh in-memory store with a recording sink.
pub fn manager() -> Result<(Manager<InMemorySwitchStore>, RecordingNotifier), ManagerError> {
    manager_with(ManagerConfig::default())
}

/// Manager over a fresh in-memory store with explicit configuration.
pub fn manager_with(
    config: ManagerConfig,
) -> Result<(Manager<InMemorySwitchStore>, RecordingNotifier), ManagerError> {
    let events = RecordingNotifier::new();
    let manager = Manager::with_config(InMemorySwitchStore::new(), events.clone(), config)?;
    Ok((manager, events))
}
