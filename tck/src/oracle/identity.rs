use indexmap::IndexMap;
use stakemint_common::crypto::{Address, KeyPair};

use crate::error::{HarnessError, HarnessResult};

/// Signing credentials of the synthetic partners a scenario creates.
///
/// Owned by the scenario and passed by reference to whatever needs to
/// sign on a partner's behalf.
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    keys: IndexMap<Address, KeyPair>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key`, returns the address it controls.
    pub fn insert(&mut self, key: KeyPair) -> Address {
        let address = key.address();
        self.keys.insert(address, key);
        address
    }

    pub fn get(&self, address: &Address) -> Option<&KeyPair> {
        self.keys.get(address)
    }

    /// Credential for `address`, or an assertion error.
    pub fn require(&self, address: &Address) -> HarnessResult<&KeyPair> {
        self.get(address).ok_or_else(|| {
            HarnessError::assertion(
                "identity registry",
                format!("credential for {}", address),
                "none",
            )
        })
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.keys.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Registered credentials in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (&Address, &KeyPair)> {
        self.keys.iter()
    }
}
