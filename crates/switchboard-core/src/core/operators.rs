// switchboard-core/src/core/operators.rs
// ============================================================================
// Module: Built-In Operators
// Description: Serializable operators for common switch conditions.
// Purpose: Compare, bucket, and test JSON values extracted by arguments.
// Dependencies: serde, serde_json, sha2, thiserror
// ============================================================================

//! ## Overview
//! Built-in operators cover equality, ordering, ranges, set membership, and
//! deterministic percentage rollouts. Ordering applies to numbers (numeric
//! comparison) and strings (lexicographic comparison); any other pairing never
//! applies. Percentage operators bucket a value into `0..100` from the SHA-256
//! digest of its canonical JSON text, so the same value lands in the same
//! bucket in every process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Ordering;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::core::condition::Operator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of percentage buckets.
pub const PERCENT_BUCKETS: u8 = 100;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when validating operator parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperatorError {
    /// Percentage bound outside `0..=100`.
    #[error("percentage {0} exceeds 100")]
    PercentOutOfRange(u8),
    /// Range bounds are inverted.
    #[error("range lower bound {lower} exceeds upper bound {upper}")]
    InvertedRange {
        /// Lower bound.
        lower: String,
        /// Upper bound.
        upper: String,
    },
    /// Set membership with an empty set.
    #[error("in_set requires at least one value")]
    EmptySet,
}

// ============================================================================
// SECTION: Built-In Operators
// ============================================================================

/// Built-in operator set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BuiltinOperator {
    /// Value is truthy (non-null, non-false, non-zero, non-empty).
    Truthy,
    /// Value equals the operand.
    Equals {
        /// Expected value.
        value: Value,
    },
    /// Value differs from the operand.
    NotEquals {
        /// Rejected value.
        value: Value,
    },
    /// Value orders strictly below the operand.
    LessThan {
        /// Upper bound.
        value: Value,
    },
    /// Value orders below or equal to the operand.
    LessThanOrEqual {
        /// Inclusive upper bound.
        value: Value,
    },
    /// Value orders strictly above the operand.
    MoreThan {
        /// Lower bound.
        value: Value,
    },
    /// Value orders above or equal to the operand.
    MoreThanOrEqual {
        /// Inclusive lower bound.
        value: Value,
    },
    /// Value lies strictly between both bounds.
    Between {
        /// Exclusive lower bound.
        lower: Value,
        /// Exclusive upper bound.
        upper: Value,
    },
    /// Value is one of the listed values.
    InSet {
        /// Accepted values.
        values: Vec<Value>,
    },
    /// Value hashes into the first `percentage` buckets.
    Percent {
        /// Share of buckets that apply (`0..=100`).
        percentage: u8,
    },
    /// Value hashes into buckets `lower..upper`.
    PercentRange {
        /// Inclusive lower bucket.
        lower: u8,
        /// Exclusive upper bucket.
        upper: u8,
    },
}

impl BuiltinOperator {
    /// Returns the stable snake-case label for the operator kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Truthy => "truthy",
            Self::Equals {
                ..
            } => "equals",
            Self::NotEquals {
                ..
            } => "not_equals",
            Self::LessThan {
                ..
            } => "less_than",
            Self::LessThanOrEqual {
                ..
            } => "less_than_or_equal",
            Self::MoreThan {
                ..
            } => "more_than",
            Self::MoreThanOrEqual {
                ..
            } => "more_than_or_equal",
            Self::Between {
                ..
            } => "between",
            Self::InSet {
                ..
            } => "in_set",
            Self::Percent {
                ..
            } => "percent",
            Self::PercentRange {
                ..
            } => "percent_range",
        }
    }

    /// Validates operator parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError`] when bounds are out of range or inverted.
    pub fn validate(&self) -> Result<(), OperatorError> {
        match self {
            Self::Percent {
                percentage,
            } => check_percent(*percentage),
            Self::PercentRange {
                lower,
                upper,
            } => {
                check_percent(*lower)?;
                check_percent(*upper)?;
                if lower > upper {
                    return Err(OperatorError::InvertedRange {
                        lower: lower.to_string(),
                        upper: upper.to_string(),
                    });
                }
                Ok(())
            }
            Self::Between {
                lower,
                upper,
            } => {
                if compare_values(lower, upper) == Some(Ordering::Greater) {
                    return Err(OperatorError::InvertedRange {
                        lower: lower.to_string(),
                        upper: upper.to_string(),
                    });
                }
                Ok(())
            }
            Self::InSet {
                values,
            } if values.is_empty() => Err(OperatorError::EmptySet),
            _ => Ok(()),
        }
    }
}

impl Operator for BuiltinOperator {
    fn applies_to(&self, value: &Value) -> bool {
        match self {
            Self::Truthy => is_truthy(value),
            Self::Equals {
                value: expected,
            } => value == expected,
            Self::NotEquals {
                value: rejected,
            } => value != rejected,
            Self::LessThan {
                value: bound,
            } => compare_values(value, bound) == Some(Ordering::Less),
            Self::LessThanOrEqual {
                value: bound,
            } => matches!(compare_values(value, bound), Some(Ordering::Less | Ordering::Equal)),
            Self::MoreThan {
                value: bound,
            } => compare_values(value, bound) == Some(Ordering::Greater),
            Self::MoreThanOrEqual {
                value: bound,
            } => matches!(compare_values(value, bound), Some(Ordering::Greater | Ordering::Equal)),
            Self::Between {
                lower,
                upper,
            } => {
                compare_values(value, lower) == Some(Ordering::Greater)
                    && compare_values(value, upper) == Some(Ordering::Less)
            }
            Self::InSet {
                values,
            } => values.contains(value),
            Self::Percent {
                percentage,
            } => percent_bucket(value).is_some_and(|bucket| bucket < *percentage),
            Self::PercentRange {
                lower,
                upper,
            } => percent_bucket(value).is_some_and(|bucket| *lower <= bucket && bucket < *upper),
        }
    }
}

impl fmt::Display for BuiltinOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Truthy => f.write_str("is truthy"),
            Self::Equals {
                value,
            } => write!(f, "== {value}"),
            Self::NotEquals {
                value,
            } => write!(f, "!= {value}"),
            Self::LessThan {
                value,
            } => write!(f, "< {value}"),
            Self::LessThanOrEqual {
                value,
            } => write!(f, "<= {value}"),
            Self::MoreThan {
                value,
            } => write!(f, "> {value}"),
            Self::MoreThanOrEqual {
                value,
            } => write!(f, ">= {value}"),
            Self::Between {
                lower,
                upper,
            } => write!(f, "between {lower} and {upper}"),
            Self::InSet {
                values,
            } => write!(f, "in set of {}", values.len()),
            Self::Percent {
                percentage,
            } => write!(f, "in {percentage}%"),
            Self::PercentRange {
                lower,
                upper,
            } => write!(f, "in {lower}%..{upper}%"),
        }
    }
}

// ============================================================================
// SECTION: Value Helpers
// ============================================================================

/// Orders two values when they are both numbers or both strings.
#[must_use]
pub fn compare_values(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Number(left), Value::Number(right)) => {
            if let (Some(left), Some(right)) = (left.as_i64(), right.as_i64()) {
                return Some(left.cmp(&right));
            }
            if let (Some(left), Some(right)) = (left.as_u64(), right.as_u64()) {
                return Some(left.cmp(&right));
            }
            left.as_f64()?.partial_cmp(&right.as_f64()?)
        }
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        _ => None,
    }
}

/// Returns true for non-null, non-false, non-zero, non-empty values.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Buckets a value into `0..100` from the digest of its JSON text.
#[must_use]
pub fn percent_bucket(value: &Value) -> Option<u8> {
    let text = serde_json::to_string(value).ok()?;
    let digest = Sha256::digest(text.as_bytes());
    let mut prefix = [0_u8; 8];
    prefix.copy_from_slice(digest.get(.. 8)?);
    let bucket = u64::from_be_bytes(prefix) % u64::from(PERCENT_BUCKETS);
    u8::try_from(bucket).ok()
}

/// Rejects percentages above 100.
fn check_percent(percentage: u8) -> Result<(), OperatorError> {
    if percentage > PERCENT_BUCKETS {
        return Err(OperatorError::PercentOutOfRange(percentage));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
