//! Contract execution interface of the simulated chain.
//!
//! Contract code runs natively: each deployed instance is a [`ContractCode`]
//! object that decodes its own call data. A call either returns encoded
//! output or reverts with an error message; the chain turns reverts into
//! failed receipts and discards any state the call touched.

use anyhow::ensure;
use stakemint_common::{
    crypto::{Address, Hash},
    receipt::Log,
};

/// Execution context handed to contract code for one call.
#[derive(Debug)]
pub struct CallEnv {
    /// Account that signed the transaction (zero for read calls)
    pub sender: Address,
    /// Address of the executing contract
    pub this: Address,
    /// Height of the block the call executes in
    pub block_number: u64,
    /// True for read calls: emitting an event reverts the call
    pub read_only: bool,
    logs: Vec<Log>,
}

impl CallEnv {
    pub fn new(sender: Address, this: Address, block_number: u64, read_only: bool) -> Self {
        Self {
            sender,
            this,
            block_number,
            read_only,
            logs: Vec::new(),
        }
    }

    /// Emit an event from the executing contract.
    ///
    /// Fails in a read-only call, which reverts the whole call.
    pub fn emit(&mut self, topics: Vec<Hash>, data: Vec<u8>) -> anyhow::Result<()> {
        ensure!(!self.read_only, "state change in a read-only call");
        let log_index = self.logs.len() as u32;
        self.logs.push(Log {
            address: self.this,
            topics,
            data,
            block_number: self.block_number,
            log_index,
        });
        Ok(())
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    pub fn into_logs(self) -> Vec<Log> {
        self.logs
    }
}

/// Executable contract code with its own state.
pub trait ContractCode: Send + Sync {
    /// Human readable contract name
    fn name(&self) -> &str;

    /// Run the constructor with encoded arguments.
    fn construct(&mut self, env: &mut CallEnv, args: &[u8]) -> anyhow::Result<()>;

    /// Dispatch encoded call data (selector + arguments).
    fn invoke(&mut self, env: &mut CallEnv, input: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Independent copy of the current state.
    ///
    /// The chain executes every call against a snapshot and only keeps it
    /// when the call succeeds.
    fn snapshot(&self) -> Box<dyn ContractCode>;
}
