use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid hexadecimal string format
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),

    /// Address has invalid length
    #[error("Invalid address length: {len} bytes, expected: {expected} bytes")]
    InvalidAddressLength { len: usize, expected: usize },

    /// Public key bytes do not describe a valid curve point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature verification failed
    #[error("Signature verification failed")]
    VerificationFailed,
}
