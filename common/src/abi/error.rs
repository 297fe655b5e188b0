use thiserror::Error;

/// Errors raised while packing or unpacking method arguments.
///
/// Every variant indicates a mismatch between the harness and the contract
/// schema; none of them is recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// The ABI document could not be parsed
    #[error("invalid ABI document: {0}")]
    Json(String),

    /// A parameter type is not supported by the codec
    #[error("unsupported parameter type '{0}'")]
    UnknownType(String),

    /// No method with this name in the table
    #[error("unknown method '{0}'")]
    UnknownMethod(String),

    /// No event with this name in the table
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    /// Call data starts with a selector no method matches
    #[error("unknown selector 0x{0}")]
    UnknownSelector(String),

    /// Wrong number of values for the schema
    #[error("{context}: expected {expected} values, got {got}")]
    ArityMismatch {
        context: String,
        expected: usize,
        got: usize,
    },

    /// A value does not have the type the schema asks for
    #[error("{context}: value #{index} expected {expected}, got {got}")]
    TypeMismatch {
        context: String,
        index: usize,
        expected: String,
        got: String,
    },

    /// An integer does not fit the declared bit width
    #[error("value #{index} does not fit in {bits} bits")]
    ValueOutOfRange { index: usize, bits: usize },

    /// Encoded data is shorter than the schema requires
    #[error("encoded data truncated: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    /// Encoded data is malformed (bad padding, bad offsets, invalid utf-8)
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}
