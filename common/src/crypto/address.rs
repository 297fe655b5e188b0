use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use super::{keccak256, CryptoError};

pub const ADDRESS_SIZE: usize = 20;

/// Account or contract address: the low 20 bytes of a keccak-256 digest.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Default)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Address(bytes)
    }

    pub const fn zero() -> Self {
        Address([0; ADDRESS_SIZE])
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; ADDRESS_SIZE]
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Derive an address from arbitrary key material.
    pub fn from_key_material(material: &[u8]) -> Self {
        let digest = keccak256(material);
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(&digest.as_bytes()[32 - ADDRESS_SIZE..]);
        Address(bytes)
    }

    /// Contract address for the `nonce`-th deployment of `deployer`.
    pub fn for_contract(deployer: &Address, nonce: u64) -> Self {
        let mut material = Vec::with_capacity(ADDRESS_SIZE + 8);
        material.extend_from_slice(&deployer.0);
        material.extend_from_slice(&nonce.to_be_bytes());
        Self::from_key_material(&material)
    }

    /// Build an address with the given value in its last bytes, handy for
    /// fixed well-known addresses like `0x...01`.
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes[ADDRESS_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Address(bytes)
    }
}

impl FromStr for Address {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        let bytes: [u8; ADDRESS_SIZE] =
            bytes
                .try_into()
                .map_err(|v: Vec<u8>| CryptoError::InvalidAddressLength {
                    len: v.len(),
                    expected: ADDRESS_SIZE,
                })?;
        Ok(Address(bytes))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'a> Deserialize<'a> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(SerdeError::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display() {
        let address: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
        assert_eq!(address, Address::from_low_u64(1));
        assert_eq!(
            address.to_string(),
            "0x0000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_parse_wrong_length() {
        let err = "0x0102".parse::<Address>().unwrap_err();
        assert_eq!(
            err,
            CryptoError::InvalidAddressLength {
                len: 2,
                expected: ADDRESS_SIZE
            }
        );
    }

    #[test]
    fn test_contract_address_depends_on_nonce() {
        let deployer = Address::from_low_u64(42);
        assert_ne!(
            Address::for_contract(&deployer, 0),
            Address::for_contract(&deployer, 1)
        );
    }
}
