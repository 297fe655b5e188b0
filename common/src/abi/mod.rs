//! Method table and argument codec.
//!
//! Schemas are loaded from a JSON ABI document with `alloy-json-abi`; values
//! are packed and unpacked with `alloy-dyn-abi`. The harness-facing types
//! ([`AbiValue`], [`ParamType`]) only cover what the token uses: addresses,
//! unsigned integers, booleans and strings.

mod codec;
mod error;
mod table;
mod value;

pub use codec::{decode, encode, WORD_SIZE};
pub use error::AbiError;
pub use table::{Constructor, Event, Method, MethodTable, Mutability, Param};
pub use value::{field, single_value, AbiValue, FromAbiValues, ParamType};
