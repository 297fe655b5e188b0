use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::AbiError;
use crate::crypto::Address;

/// Static shape of a method parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamType {
    Address,
    /// Unsigned integer with the given bit width (8..=256, multiple of 8)
    Uint(usize),
    Bool,
    String,
}

impl ParamType {
    /// Parse a canonical type name such as `uint256` or `address`.
    pub fn parse(name: &str) -> Result<Self, AbiError> {
        match name {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "string" => Ok(ParamType::String),
            "uint" => Ok(ParamType::Uint(256)),
            other => {
                let bits = other
                    .strip_prefix("uint")
                    .and_then(|b| b.parse::<usize>().ok())
                    .filter(|b| *b > 0 && *b <= 256 && b % 8 == 0)
                    .ok_or_else(|| AbiError::UnknownType(other.to_string()))?;
                Ok(ParamType::Uint(bits))
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Bool => write!(f, "bool"),
            ParamType::String => write!(f, "string"),
        }
    }
}

/// A decoded argument or return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
    String(String),
}

impl AbiValue {
    /// Short name of the value kind, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Uint(_) => "uint",
            AbiValue::Bool(_) => "bool",
            AbiValue::String(_) => "string",
        }
    }

    /// Whether this value can be encoded as `param`.
    pub fn matches(&self, param: &ParamType) -> bool {
        matches!(
            (self, param),
            (AbiValue::Address(_), ParamType::Address)
                | (AbiValue::Uint(_), ParamType::Uint(_))
                | (AbiValue::Bool(_), ParamType::Bool)
                | (AbiValue::String(_), ParamType::String)
        )
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(a) => write!(f, "{}", a),
            AbiValue::Uint(v) => write!(f, "{}", v),
            AbiValue::Bool(b) => write!(f, "{}", b),
            AbiValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        AbiValue::Address(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        AbiValue::Uint(value)
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<u8> for AbiValue {
    fn from(value: u8) -> Self {
        AbiValue::Uint(U256::from(value))
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        AbiValue::String(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        AbiValue::String(value.to_string())
    }
}

/// Conversion from the ordered return values of a method into a typed value.
///
/// Single-value getters convert from a one-element list; record-like
/// getters implement this for their own struct.
pub trait FromAbiValues: Sized {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError>;
}

impl FromAbiValues for Vec<AbiValue> {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        Ok(values)
    }
}

impl FromAbiValues for () {
    fn from_abi_values(_values: Vec<AbiValue>) -> Result<Self, AbiError> {
        Ok(())
    }
}

/// Take the single value out of `values`, failing on any other arity.
pub fn single_value(values: Vec<AbiValue>) -> Result<AbiValue, AbiError> {
    let got = values.len();
    let mut iter = values.into_iter();
    match (iter.next(), iter.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(AbiError::ArityMismatch {
            context: "return values".to_string(),
            expected: 1,
            got,
        }),
    }
}

/// Pull the value at `index` out of a decoded list as a typed field.
pub fn field<T: FromAbiValues>(values: &[AbiValue], index: usize) -> Result<T, AbiError> {
    let value = values.get(index).cloned().ok_or(AbiError::ArityMismatch {
        context: "record fields".to_string(),
        expected: index + 1,
        got: values.len(),
    })?;
    T::from_abi_values(vec![value])
}

fn mismatch(expected: &str, got: &AbiValue) -> AbiError {
    AbiError::TypeMismatch {
        context: "return value".to_string(),
        index: 0,
        expected: expected.to_string(),
        got: got.kind().to_string(),
    }
}

impl FromAbiValues for U256 {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        let value = single_value(values)?;
        value.as_uint().ok_or_else(|| mismatch("uint256", &value))
    }
}

impl FromAbiValues for u64 {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        let value = U256::from_abi_values(values)?;
        if value.bits() > 64 {
            return Err(AbiError::ValueOutOfRange { index: 0, bits: 64 });
        }
        Ok(value.low_u64())
    }
}

impl FromAbiValues for u8 {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        let value = U256::from_abi_values(values)?;
        if value.bits() > 8 {
            return Err(AbiError::ValueOutOfRange { index: 0, bits: 8 });
        }
        Ok(value.low_u64() as u8)
    }
}

impl FromAbiValues for Address {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        let value = single_value(values)?;
        value.as_address().ok_or_else(|| mismatch("address", &value))
    }
}

impl FromAbiValues for bool {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        let value = single_value(values)?;
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromAbiValues for String {
    fn from_abi_values(values: Vec<AbiValue>) -> Result<Self, AbiError> {
        match single_value(values)? {
            AbiValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}
