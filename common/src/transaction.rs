use serde::{Deserialize, Serialize};

use crate::crypto::{keccak256, Address, CryptoError, Hash, KeyPair, PublicKey, Signature};

/// A signed state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub to: Address,
    pub data: Vec<u8>,
    pub public_key: PublicKey,
    pub signature: Signature,
}

/// Bytes covered by the transaction signature.
pub fn signing_payload(nonce: u64, to: &Address, data: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(8 + 20 + data.len());
    payload.extend_from_slice(&nonce.to_be_bytes());
    payload.extend_from_slice(to.as_bytes());
    payload.extend_from_slice(data);
    payload
}

impl Transaction {
    /// Build and sign a transaction with `key`.
    pub fn signed(key: &KeyPair, nonce: u64, to: Address, data: Vec<u8>) -> Self {
        let signature = key.sign(&signing_payload(nonce, &to, &data));
        Self {
            nonce,
            to,
            data,
            public_key: key.public_key(),
            signature,
        }
    }

    pub fn sender(&self) -> Address {
        self.public_key.to_address()
    }

    pub fn hash(&self) -> Hash {
        let mut material = signing_payload(self.nonce, &self.to, &self.data);
        material.extend_from_slice(self.signature.as_bytes());
        keccak256(&material)
    }

    pub fn verify_signature(&self) -> Result<(), CryptoError> {
        self.public_key
            .verify(&signing_payload(self.nonce, &self.to, &self.data), &self.signature)
    }
}

/// Summary of a transaction for logs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub hash: Hash,
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
}

impl From<&Transaction> for TransactionSummary {
    fn from(tx: &Transaction) -> Self {
        Self {
            hash: tx.hash(),
            from: tx.sender(),
            to: tx.to,
            nonce: tx.nonce,
        }
    }
}
