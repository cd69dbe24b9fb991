//! Errors

use thiserror::Error;

/// Convenience result type for closure processing.
pub type ClosureResult<T> = Result<T, ClosureError>;

/// Failures while flattening a closure tree into a composite.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ClosureError {
    /// Adding an entry would exceed the composite's entry or payload budget.
    #[error("maximum number of closures exceeded ({max_closures} entries, {max_pool_size} payload bytes)")]
    CapacityExceeded {
        max_closures: usize,
        max_pool_size: usize,
    },

    /// Unrecognized subsurface profile tag.
    #[error("unknown subsurface profile: {0}")]
    InvalidProfile(String),

    /// Unrecognized microfacet distribution tag.
    #[error("invalid microfacet distribution function: {0}")]
    InvalidDistribution(String),

    /// A closure parameter is missing or has the wrong type.
    #[error("closure {closure}: parameter {param} expected {expected}")]
    InvalidParameter {
        closure: &'static str,
        param: String,
        expected: String,
    },
}

impl ClosureError {
    /// Build a [`ClosureError::InvalidParameter`] value.
    ///
    /// * `closure`  - Closure name.
    /// * `param`    - Parameter name or position.
    /// * `expected` - What was expected.
    pub fn invalid_parameter(closure: &'static str, param: impl Into<String>, expected: impl ToString) -> Self {
        Self::InvalidParameter {
            closure,
            param: param.into(),
            expected: expected.to_string(),
        }
    }
}
