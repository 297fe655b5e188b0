use serde::{Deserialize, Serialize};

use crate::crypto::{Address, Hash};

/// Receipt status of a transaction the contract rejected.
pub const STATUS_FAILED: u64 = 0;
/// Receipt status of a transaction the contract accepted.
pub const STATUS_SUCCESS: u64 = 1;

/// An event emitted by a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract that emitted the event
    pub address: Address,
    /// Ordered topics; topic[0] identifies the event
    pub topics: Vec<Hash>,
    /// Encoded non-indexed fields
    pub data: Vec<u8>,
    /// Block the emitting transaction was included in
    pub block_number: u64,
    /// Position of the log within its transaction
    pub log_index: u32,
}

impl Log {
    /// Returns true if topic[0] equals `event_id`.
    pub fn is_event(&self, event_id: &Hash) -> bool {
        self.topics.first() == Some(event_id)
    }

    pub fn topic(&self, index: usize) -> Option<&Hash> {
        self.topics.get(index)
    }
}

/// Outcome of a state-changing transaction.
///
/// A receipt with `status == STATUS_FAILED` is a normal result: the
/// transaction was included in a block but the contract rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: Hash,
    pub status: u64,
    pub from: Address,
    pub to: Address,
    /// Height of the block the transaction was included in
    pub block_number: u64,
    pub logs: Vec<Log>,
    /// Revert message when the contract rejected the transaction
    pub revert_reason: Option<String>,
}

impl Receipt {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }

    /// Logs whose topic[0] equals `event_id`, in emission order.
    pub fn logs_for<'a>(&'a self, event_id: &'a Hash) -> impl Iterator<Item = &'a Log> + 'a {
        self.logs.iter().filter(move |log| log.is_event(event_id))
    }
}
