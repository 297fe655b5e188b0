#![allow(clippy::module_inception)]
#![allow(clippy::too_many_arguments)]

pub mod abi;
pub mod config;
pub mod crypto;
pub mod receipt;
pub mod transaction;
