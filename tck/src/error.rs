//! Error type shared by the contract handle, the oracle and the drivers.
//!
//! There is no recoverable path: any divergence between the contract and
//! the reference model aborts the scenario with one of these values.

use std::fmt::Display;

use stakemint_common::abi::AbiError;
use thiserror::Error;

use crate::chain::ClientError;

/// Result alias used across the kit.
pub type HarnessResult<T> = Result<T, HarnessError>;

/// Failure of a harness operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum HarnessError {
    /// Arguments or return values did not fit the method schema
    #[error("encoding error: {0}")]
    Encoding(AbiError),

    /// The environment rejected a read call
    #[error("{method} reverted: {reason}")]
    Execution { method: String, reason: String },

    /// The environment could not process a transaction
    #[error("transport error: {0}")]
    Transport(String),

    /// Contract construction was rejected
    #[error("deployment failed: {0}")]
    Deployment(String),

    /// Observed state differs from the reference model
    #[error("{context}: expected {expected}, got {actual}")]
    Assertion {
        context: String,
        expected: String,
        actual: String,
    },

    /// A successful receipt lacked an event the operation must emit
    #[error("{method} emitted no {event} event")]
    MissingEvent { method: String, event: String },

    /// A bounded loop hit its cap
    #[error("{what} did not converge within {limit} iterations")]
    Exhausted { what: String, limit: u64 },

    /// The method table has no such method
    #[error("unknown method: {0}")]
    UnknownMethod(String),
}

impl HarnessError {
    /// Build an assertion failure carrying both values.
    pub fn assertion(
        context: impl Into<String>,
        expected: impl Display,
        actual: impl Display,
    ) -> Self {
        HarnessError::Assertion {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub fn exhausted(what: impl Into<String>, limit: u64) -> Self {
        HarnessError::Exhausted {
            what: what.into(),
            limit,
        }
    }

    /// Attribute an execution client failure to `method`.
    pub fn from_client(method: &str, err: ClientError) -> Self {
        match err {
            ClientError::Execution { reason } => HarnessError::Execution {
                method: method.to_string(),
                reason,
            },
            ClientError::Deployment { reason } => HarnessError::Deployment(reason),
            other => HarnessError::Transport(other.to_string()),
        }
    }
}

impl From<AbiError> for HarnessError {
    fn from(err: AbiError) -> Self {
        match err {
            AbiError::UnknownMethod(name) => HarnessError::UnknownMethod(name),
            other => HarnessError::Encoding(other),
        }
    }
}

/// Fail with an assertion error unless `expected == actual`.
pub fn ensure_eq<T: PartialEq + Display>(
    context: impl Into<String>,
    expected: T,
    actual: T,
) -> HarnessResult<()> {
    if expected != actual {
        return Err(HarnessError::assertion(context, expected, actual));
    }
    Ok(())
}
