//! Execution client capability surface.
//!
//! The kit only ever talks to the chain through [`ExecutionClient`]: deploy,
//! read call, signed execute, advance one block. Everything is awaited
//! sequentially by a single driver.

use async_trait::async_trait;
use stakemint_common::{
    crypto::{Address, Hash, KeyPair},
    receipt::Receipt,
};
use thiserror::Error;

use super::vm::ContractCode;

/// Error type for execution client operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[allow(missing_docs)]
pub enum ClientError {
    /// The environment could not process a submission (nonce, signature...)
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// Contract construction was rejected
    #[error("deployment rejected: {reason}")]
    Deployment { reason: String },

    /// A read call reverted
    #[error("call reverted: {reason}")]
    Execution { reason: String },

    /// No contract is deployed at the target address
    #[error("no contract deployed at {address}")]
    UnknownContract { address: Address },

    /// Warp would exceed maximum allowed advancement
    #[error("warp of {requested} blocks exceeds maximum {max}")]
    ExceedsMaxWarp { requested: u64, max: u64 },

    /// Target height is behind current state
    #[error("target height {target} is behind current {current}")]
    TargetBehindCurrent { target: u64, current: u64 },
}

/// A deterministic, block-producing execution environment.
///
/// Every state-changing operation (deploy, execute) is included in a block
/// of its own; there is no mempool and no concurrent submission.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Deploy `code`, running its constructor with encoded `constructor_args`.
    ///
    /// Returns the contract address and the height of the deployment block.
    async fn deploy(
        &mut self,
        deployer: &KeyPair,
        code: Box<dyn ContractCode>,
        constructor_args: Vec<u8>,
    ) -> Result<(Address, u64), ClientError>;

    /// Read-only call against the latest state. Never mutates the chain.
    async fn call(&self, address: &Address, data: &[u8]) -> Result<Vec<u8>, ClientError>;

    /// Sign `data` with `key`, submit it to `address` and mine a block.
    ///
    /// The receipt is returned whatever its status; only failures of the
    /// environment itself are errors.
    async fn execute(
        &mut self,
        address: &Address,
        key: &KeyPair,
        data: Vec<u8>,
    ) -> Result<Receipt, ClientError>;

    /// Produce one empty block, returns the new height.
    async fn advance_block(&mut self) -> Result<u64, ClientError>;

    /// Height of the latest block.
    fn current_block_height(&self) -> u64;

    /// Create a fresh, unfunded credential.
    fn new_credential(&self) -> KeyPair;

    /// Receipt of a previously executed transaction.
    async fn receipt(&self, tx_hash: &Hash) -> Option<Receipt>;
}
