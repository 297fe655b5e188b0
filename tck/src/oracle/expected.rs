use std::fmt;

use primitive_types::U256;
use stakemint_common::{
    abi::{AbiValue, ParamType},
    crypto::Address,
};

/// An expected getter value, tagged with its ABI type.
///
/// Matching is exact: the declared output type must be the tag's type and
/// the decoded value must be equal. A `uint8` getter never matches
/// `Expected::Uint` even when the numbers agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Address(Address),
    Uint(U256),
    Uint8(u8),
    Text(String),
    Bool(bool),
}

impl Expected {
    pub fn param_type(&self) -> ParamType {
        match self {
            Expected::Address(_) => ParamType::Address,
            Expected::Uint(_) => ParamType::Uint(256),
            Expected::Uint8(_) => ParamType::Uint(8),
            Expected::Text(_) => ParamType::String,
            Expected::Bool(_) => ParamType::Bool,
        }
    }

    /// Value to pass as a call argument.
    pub fn to_abi_value(&self) -> AbiValue {
        match self {
            Expected::Address(a) => AbiValue::Address(*a),
            Expected::Uint(v) => AbiValue::Uint(*v),
            Expected::Uint8(v) => AbiValue::Uint(U256::from(*v)),
            Expected::Text(s) => AbiValue::String(s.clone()),
            Expected::Bool(b) => AbiValue::Bool(*b),
        }
    }

    /// Returns true if `value`, declared as `kind`, is exactly this value.
    pub fn matches(&self, kind: &ParamType, value: &AbiValue) -> bool {
        *kind == self.param_type() && self.to_abi_value() == *value
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Address(a) => write!(f, "{}", a),
            Expected::Uint(v) => write!(f, "{}", v),
            Expected::Uint8(v) => write!(f, "{}", v),
            Expected::Text(s) => write!(f, "{:?}", s),
            Expected::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<Address> for Expected {
    fn from(value: Address) -> Self {
        Expected::Address(value)
    }
}

impl From<U256> for Expected {
    fn from(value: U256) -> Self {
        Expected::Uint(value)
    }
}

impl From<u64> for Expected {
    fn from(value: u64) -> Self {
        Expected::Uint(U256::from(value))
    }
}

impl From<u8> for Expected {
    fn from(value: u8) -> Self {
        Expected::Uint8(value)
    }
}

impl From<&str> for Expected {
    fn from(value: &str) -> Self {
        Expected::Text(value.to_string())
    }
}

impl From<bool> for Expected {
    fn from(value: bool) -> Self {
        Expected::Bool(value)
    }
}
