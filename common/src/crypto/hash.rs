use serde::de::Error as SerdeError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::{
    convert::TryInto,
    fmt::{Display, Error, Formatter},
    str::FromStr,
};

use super::Address;

pub const HASH_SIZE: usize = 32; // 32 bytes / 256 bits

/// 32-byte word used for transaction hashes, event topics and selectors.
#[derive(Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Default)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub const fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    pub const fn zero() -> Self {
        Hash::new([0; HASH_SIZE])
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    pub fn to_bytes(self) -> [u8; HASH_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Interpret the low 20 bytes as an address, the way indexed
    /// address parameters are stored in event topics.
    pub fn to_address(&self) -> Address {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&self.0[12..]);
        Address::new(bytes)
    }
}

impl FromStr for Hash {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(|_| "Invalid hex string")?;
        let bytes: [u8; HASH_SIZE] = bytes.try_into().map_err(|_| "Invalid hash")?;
        Ok(Hash::new(bytes))
    }
}

// Hash a byte array using keccak-256
#[inline(always)]
pub fn keccak256(value: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(value);
    let result: [u8; HASH_SIZE] = hasher.finalize().into();
    Hash(result)
}

impl From<Address> for Hash {
    fn from(address: Address) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        bytes[12..].copy_from_slice(address.as_bytes());
        Hash(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "0x{}", &self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'a> Deserialize<'a> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'a>,
    {
        let hex = String::deserialize(deserializer)?;
        let hex = hex.trim_start_matches("0x");
        if hex.len() != HASH_SIZE * 2 {
            return Err(SerdeError::custom("Invalid hex length"));
        }

        let decoded_hex = hex::decode(hex).map_err(SerdeError::custom)?;
        let bytes: [u8; 32] = decoded_hex
            .try_into()
            .map_err(|_| SerdeError::custom("Could not transform hex to bytes array for Hash"))?;
        Ok(Hash::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak_empty_input() {
        // Well-known keccak-256 of the empty string
        let expected: Hash = "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
            .parse()
            .unwrap();
        assert_eq!(keccak256(&[]), expected);
    }

    #[test]
    fn test_address_topic_roundtrip() {
        let address = Address::new([7u8; 20]);
        let topic = Hash::from(address);
        assert_eq!(&topic.as_bytes()[..12], &[0u8; 12]);
        assert_eq!(topic.to_address(), address);
    }

    #[test]
    fn test_serde_hex() {
        let hash = keccak256(b"Staked(address,address,uint256)");
        let json = serde_json::to_string(&hash).unwrap();
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(hash, back);
    }
}
