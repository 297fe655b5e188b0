use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_primitives::{Address as SolAddress, U256 as SolU256};
use primitive_types::U256;

use super::{AbiError, AbiValue, ParamType};
use crate::crypto::Address;

pub const WORD_SIZE: usize = 32;

impl ParamType {
    pub(crate) fn to_sol_type(self) -> DynSolType {
        match self {
            ParamType::Address => DynSolType::Address,
            ParamType::Uint(bits) => DynSolType::Uint(bits),
            ParamType::Bool => DynSolType::Bool,
            ParamType::String => DynSolType::String,
        }
    }
}

fn to_sol_uint(value: &U256) -> SolU256 {
    SolU256::from_be_bytes(value.to_big_endian())
}

fn from_sol_uint(value: &SolU256) -> U256 {
    U256::from_big_endian(&value.to_be_bytes::<32>())
}

/// Check `value` against `param` and convert it for the codec.
pub(crate) fn to_sol_value(
    context: &str,
    index: usize,
    param: &ParamType,
    value: &AbiValue,
) -> Result<DynSolValue, AbiError> {
    match (param, value) {
        (ParamType::Address, AbiValue::Address(a)) => {
            Ok(DynSolValue::Address(SolAddress::from(*a.as_bytes())))
        }
        (ParamType::Uint(bits), AbiValue::Uint(v)) => {
            if v.bits() > *bits {
                return Err(AbiError::ValueOutOfRange {
                    index,
                    bits: *bits,
                });
            }
            Ok(DynSolValue::Uint(to_sol_uint(v), *bits))
        }
        (ParamType::Bool, AbiValue::Bool(b)) => Ok(DynSolValue::Bool(*b)),
        (ParamType::String, AbiValue::String(s)) => Ok(DynSolValue::String(s.clone())),
        _ => Err(AbiError::TypeMismatch {
            context: context.to_string(),
            index,
            expected: param.to_string(),
            got: value.kind().to_string(),
        }),
    }
}

pub(crate) fn from_sol_value(value: DynSolValue) -> Result<AbiValue, AbiError> {
    match value {
        DynSolValue::Address(a) => {
            let mut bytes = [0u8; 20];
            bytes.copy_from_slice(a.as_slice());
            Ok(AbiValue::Address(Address::new(bytes)))
        }
        DynSolValue::Uint(v, _) => Ok(AbiValue::Uint(from_sol_uint(&v))),
        DynSolValue::Bool(b) => Ok(AbiValue::Bool(b)),
        DynSolValue::String(s) => Ok(AbiValue::String(s)),
        other => Err(AbiError::UnknownType(
            other
                .as_type()
                .map(|t| t.sol_type_name().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        )),
    }
}

/// Type-check `values` against `params`, in order.
pub(crate) fn to_sol_values(
    context: &str,
    params: &[ParamType],
    values: &[AbiValue],
) -> Result<Vec<DynSolValue>, AbiError> {
    if params.len() != values.len() {
        return Err(AbiError::ArityMismatch {
            context: context.to_string(),
            expected: params.len(),
            got: values.len(),
        });
    }
    params
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (param, value))| to_sol_value(context, index, param, value))
        .collect()
}

pub(crate) fn from_sol_values(values: Vec<DynSolValue>) -> Result<Vec<AbiValue>, AbiError> {
    values.into_iter().map(from_sol_value).collect()
}

/// Encode `values` against `params` as a parameter list.
///
/// `context` names the method (or event) in error messages.
pub fn encode(context: &str, params: &[ParamType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let values = to_sol_values(context, params, values)?;
    Ok(DynSolValue::Tuple(values).abi_encode_params())
}

/// Decode a parameter list laid out as `params`.
pub fn decode(params: &[ParamType], data: &[u8]) -> Result<Vec<AbiValue>, AbiError> {
    let needed = params.len() * WORD_SIZE;
    if data.len() < needed {
        return Err(AbiError::Truncated {
            needed,
            got: data.len(),
        });
    }
    let kind = DynSolType::Tuple(params.iter().map(|p| p.to_sol_type()).collect());
    match kind.abi_decode_params(data) {
        Ok(DynSolValue::Tuple(values)) => from_sol_values(values),
        Ok(other) => from_sol_value(other).map(|value| vec![value]),
        Err(e) => Err(AbiError::InvalidEncoding(e.to_string())),
    }
}
