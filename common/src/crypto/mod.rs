mod address;
mod hash;
mod keypair;

pub mod error;

pub use address::*;
pub use error::CryptoError;
pub use hash::*;
pub use keypair::*;
