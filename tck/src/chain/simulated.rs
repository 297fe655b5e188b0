//! In-process execution environment.
//!
//! `SimulatedChain` keeps contract instances, account nonces, receipts and a
//! block list in memory. It has no gas, no mempool and immediate finality:
//! every deployment and every transaction is mined into a block of its own.

use std::collections::HashMap;

use async_trait::async_trait;
use stakemint_common::{
    crypto::{keccak256, Address, Hash, KeyPair},
    receipt::{Receipt, STATUS_FAILED, STATUS_SUCCESS},
    transaction::Transaction,
};

use super::{
    block_warp::BlockWarp,
    client::{ClientError, ExecutionClient},
    config::SimulatedChainConfig,
    vm::{CallEnv, ContractCode},
};
use crate::orchestrator::TestRng;

/// A produced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedBlock {
    pub number: u64,
    pub hash: Hash,
    pub parent: Hash,
    /// Transactions included in the block, at most one
    pub transactions: Vec<Hash>,
}

impl SimulatedBlock {
    fn new(number: u64, parent: Hash, transactions: Vec<Hash>) -> Self {
        let mut material = Vec::with_capacity(40 + transactions.len() * 32);
        material.extend_from_slice(parent.as_bytes());
        material.extend_from_slice(&number.to_be_bytes());
        for tx in &transactions {
            material.extend_from_slice(tx.as_bytes());
        }
        Self {
            number,
            hash: keccak256(&material),
            parent,
            transactions,
        }
    }
}

/// Deterministic single-node chain used to run contracts under test.
pub struct SimulatedChain {
    config: SimulatedChainConfig,
    rng: TestRng,
    blocks: Vec<SimulatedBlock>,
    nonces: HashMap<Address, u64>,
    contracts: HashMap<Address, Box<dyn ContractCode>>,
    receipts: HashMap<Hash, Receipt>,
}

impl SimulatedChain {
    /// Create a chain holding only its genesis block.
    pub fn new(config: SimulatedChainConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => TestRng::with_seed(seed),
            None => TestRng::new_from_env_or_random(),
        };
        let genesis = SimulatedBlock::new(config.genesis_height, Hash::zero(), Vec::new());

        log::info!(
            "Simulated chain started at height {} (seed 0x{:016x})",
            genesis.number,
            rng.seed()
        );

        Self {
            config,
            rng,
            blocks: vec![genesis],
            nonces: HashMap::new(),
            contracts: HashMap::new(),
            receipts: HashMap::new(),
        }
    }

    pub fn config(&self) -> &SimulatedChainConfig {
        &self.config
    }

    /// Seed of the credential generator, for replaying a run.
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Next nonce expected from `address`.
    pub fn nonce_of(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    /// Block at `number`, if produced.
    pub fn block(&self, number: u64) -> Option<&SimulatedBlock> {
        let offset = number.checked_sub(self.config.genesis_height)?;
        self.blocks.get(usize::try_from(offset).ok()?)
    }

    pub fn latest_block(&self) -> &SimulatedBlock {
        // the genesis block is pushed at construction
        &self.blocks[self.blocks.len() - 1]
    }

    /// Returns true if a contract is deployed at `address`.
    pub fn has_contract(&self, address: &Address) -> bool {
        self.contracts.contains_key(address)
    }

    /// Validate, execute and mine a pre-signed transaction.
    ///
    /// A contract revert yields a receipt with `STATUS_FAILED`; the block is
    /// still produced and the sender's nonce still consumed.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<Receipt, ClientError> {
        tx.verify_signature().map_err(|e| ClientError::Transport {
            reason: format!("invalid signature: {}", e),
        })?;

        let sender = tx.sender();
        let expected = self.nonce_of(&sender);
        if tx.nonce != expected {
            return Err(ClientError::Transport {
                reason: format!("invalid nonce: expected {}, got {}", expected, tx.nonce),
            });
        }

        let block_number = self.next_height();
        let contract = self
            .contracts
            .get(&tx.to)
            .ok_or(ClientError::UnknownContract { address: tx.to })?;

        // state is only kept when the call succeeds
        let mut working = contract.snapshot();
        let mut env = CallEnv::new(sender, tx.to, block_number, false);
        let outcome = working.invoke(&mut env, &tx.data);

        let tx_hash = tx.hash();
        let receipt = match outcome {
            Ok(_) => {
                self.contracts.insert(tx.to, working);
                Receipt {
                    tx_hash,
                    status: STATUS_SUCCESS,
                    from: sender,
                    to: tx.to,
                    block_number,
                    logs: env.into_logs(),
                    revert_reason: None,
                }
            }
            Err(e) => Receipt {
                tx_hash,
                status: STATUS_FAILED,
                from: sender,
                to: tx.to,
                block_number,
                logs: Vec::new(),
                revert_reason: Some(format!("{:#}", e)),
            },
        };

        self.nonces.insert(sender, expected.saturating_add(1));
        self.mine(vec![tx_hash]);

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "tx {} from {} -> status {} in block {} ({} logs{})",
                receipt.tx_hash,
                receipt.from,
                receipt.status,
                receipt.block_number,
                receipt.logs.len(),
                receipt
                    .revert_reason
                    .as_ref()
                    .map(|r| format!(", reverted: {}", r))
                    .unwrap_or_default()
            );
        }

        self.receipts.insert(tx_hash, receipt.clone());
        Ok(receipt)
    }

    fn next_height(&self) -> u64 {
        self.latest_block().number.saturating_add(1)
    }

    fn mine(&mut self, transactions: Vec<Hash>) -> u64 {
        let parent = self.latest_block();
        let block = SimulatedBlock::new(parent.number.saturating_add(1), parent.hash, transactions);
        let number = block.number;
        self.blocks.push(block);
        number
    }
}

#[async_trait]
impl ExecutionClient for SimulatedChain {
    async fn deploy(
        &mut self,
        deployer: &KeyPair,
        mut code: Box<dyn ContractCode>,
        constructor_args: Vec<u8>,
    ) -> Result<(Address, u64), ClientError> {
        let sender = deployer.address();
        let nonce = self.nonce_of(&sender);
        let address = Address::for_contract(&sender, nonce);
        if self.has_contract(&address) {
            return Err(ClientError::Deployment {
                reason: format!("address {} already in use", address),
            });
        }

        let block_number = self.next_height();
        let mut env = CallEnv::new(sender, address, block_number, false);
        code.construct(&mut env, &constructor_args)
            .map_err(|e| ClientError::Deployment {
                reason: format!("{} constructor reverted: {:#}", code.name(), e),
            })?;

        log::info!(
            "Deployed {} at {} in block {}",
            code.name(),
            address,
            block_number
        );

        self.contracts.insert(address, code);
        self.nonces.insert(sender, nonce.saturating_add(1));
        let height = self.mine(Vec::new());
        Ok((address, height))
    }

    async fn call(&self, address: &Address, data: &[u8]) -> Result<Vec<u8>, ClientError> {
        let contract = self
            .contracts
            .get(address)
            .ok_or(ClientError::UnknownContract { address: *address })?;

        // reads run on a throwaway copy against the latest block
        let mut scratch = contract.snapshot();
        let mut env = CallEnv::new(
            Address::zero(),
            *address,
            self.current_block_height(),
            true,
        );
        scratch
            .invoke(&mut env, data)
            .map_err(|e| ClientError::Execution {
                reason: format!("{:#}", e),
            })
    }

    async fn execute(
        &mut self,
        address: &Address,
        key: &KeyPair,
        data: Vec<u8>,
    ) -> Result<Receipt, ClientError> {
        let nonce = self.nonce_of(&key.address());
        let tx = Transaction::signed(key, nonce, *address, data);
        self.submit_transaction(tx)
    }

    async fn advance_block(&mut self) -> Result<u64, ClientError> {
        Ok(self.mine(Vec::new()))
    }

    fn current_block_height(&self) -> u64 {
        self.latest_block().number
    }

    fn new_credential(&self) -> KeyPair {
        self.rng.keypair()
    }

    async fn receipt(&self, tx_hash: &Hash) -> Option<Receipt> {
        self.receipts.get(tx_hash).cloned()
    }
}

#[async_trait]
impl BlockWarp for SimulatedChain {
    fn max_warp_blocks(&self) -> u64 {
        self.config.max_warp_blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Stores one counter; `[1]` increments, `[2]` reverts, anything
    /// else returns the counter.
    #[derive(Clone, Default)]
    struct Counter {
        value: u8,
    }

    impl ContractCode for Counter {
        fn name(&self) -> &str {
            "Counter"
        }

        fn construct(&mut self, _env: &mut CallEnv, args: &[u8]) -> anyhow::Result<()> {
            if args == [0xff] {
                bail!("bad args");
            }
            self.value = args.first().copied().unwrap_or(0);
            Ok(())
        }

        fn invoke(&mut self, env: &mut CallEnv, input: &[u8]) -> anyhow::Result<Vec<u8>> {
            match input {
                [1] => {
                    self.value += 1;
                    env.emit(vec![Hash::new([self.value; 32])], Vec::new())?;
                    Ok(Vec::new())
                }
                [2] => {
                    self.value += 100;
                    bail!("counter: refused");
                }
                _ => Ok(vec![self.value]),
            }
        }

        fn snapshot(&self) -> Box<dyn ContractCode> {
            Box::new(self.clone())
        }
    }

    fn chain() -> SimulatedChain {
        SimulatedChain::new(SimulatedChainConfig::default().with_seed(1))
    }

    #[tokio::test]
    async fn test_deploy_mines_a_block() {
        let mut chain = chain();
        let deployer = chain.new_credential();
        let (address, height) = chain
            .deploy(&deployer, Box::new(Counter::default()), vec![5])
            .await
            .unwrap();

        assert_eq!(height, 1);
        assert_eq!(chain.current_block_height(), 1);
        assert_eq!(address, Address::for_contract(&deployer.address(), 0));
        assert_eq!(chain.call(&address, &[0]).await.unwrap(), vec![5]);
    }

    #[tokio::test]
    async fn test_rejected_constructor() {
        let mut chain = chain();
        let deployer = chain.new_credential();
        let err = chain
            .deploy(&deployer, Box::new(Counter::default()), vec![0xff])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Deployment { .. }));
        assert_eq!(chain.current_block_height(), 0);
    }

    #[tokio::test]
    async fn test_execute_success_and_revert() {
        let mut chain = chain();
        let key = chain.new_credential();
        let (address, _) = chain
            .deploy(&key, Box::new(Counter::default()), vec![])
            .await
            .unwrap();

        let ok = chain.execute(&address, &key, vec![1]).await.unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.block_number, 2);
        assert_eq!(ok.logs.len(), 1);

        let failed = chain.execute(&address, &key, vec![2]).await.unwrap();
        assert_eq!(failed.status, STATUS_FAILED);
        assert_eq!(failed.block_number, 3);
        assert!(failed.logs.is_empty());
        assert_eq!(failed.revert_reason.as_deref(), Some("counter: refused"));

        // the revert left no trace in contract state
        assert_eq!(chain.call(&address, &[0]).await.unwrap(), vec![1]);
        assert_eq!(chain.nonce_of(&key.address()), 3);
        assert_eq!(chain.receipt(&failed.tx_hash).await, Some(failed));
    }

    #[tokio::test]
    async fn test_read_calls_do_not_mutate() {
        let mut chain = chain();
        let key = chain.new_credential();
        let (address, _) = chain
            .deploy(&key, Box::new(Counter::default()), vec![])
            .await
            .unwrap();

        // the increment emits an event, which a read call refuses
        match chain.call(&address, &[1]).await {
            Err(ClientError::Execution { reason }) => assert!(reason.contains("read-only")),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(chain.call(&address, &[0]).await.unwrap(), vec![0]);
        assert!(matches!(
            chain.call(&address, &[2]).await,
            Err(ClientError::Execution { .. })
        ));
        assert_eq!(chain.current_block_height(), 1);
    }

    #[tokio::test]
    async fn test_transport_errors() {
        let mut chain = chain();
        let key = chain.new_credential();
        let (address, _) = chain
            .deploy(&key, Box::new(Counter::default()), vec![])
            .await
            .unwrap();

        let stale = Transaction::signed(&key, 0, address, vec![1]);
        assert!(matches!(
            chain.submit_transaction(stale),
            Err(ClientError::Transport { .. })
        ));

        let mut forged = Transaction::signed(&key, 1, address, vec![1]);
        forged.data = vec![2];
        assert!(matches!(
            chain.submit_transaction(forged),
            Err(ClientError::Transport { .. })
        ));

        let missing = Address::from_low_u64(77);
        assert_eq!(
            chain.execute(&missing, &key, vec![1]).await.unwrap_err(),
            ClientError::UnknownContract { address: missing }
        );
        assert_eq!(chain.current_block_height(), 1);
    }

    #[tokio::test]
    async fn test_warp_and_blocks() {
        let mut chain =
            SimulatedChain::new(SimulatedChainConfig::default().with_seed(2).with_max_warp(5));
        assert_eq!(chain.warp_blocks(5).await.unwrap(), 5);
        assert!(matches!(
            chain.warp_blocks(6).await,
            Err(ClientError::ExceedsMaxWarp { requested: 6, max: 5 })
        ));
        chain.warp_to_height(8).await.unwrap();
        assert_eq!(chain.current_block_height(), 8);
        assert!(chain.warp_to_height(3).await.is_err());

        let block = chain.block(8).unwrap();
        assert_eq!(block.parent, chain.block(7).unwrap().hash);
        assert!(chain.block(9).is_none());
    }

    #[tokio::test]
    async fn test_genesis_height() {
        let mut chain = SimulatedChain::new(
            SimulatedChainConfig::default()
                .with_seed(3)
                .with_genesis_height(100),
        );
        assert_eq!(chain.current_block_height(), 100);
        assert_eq!(chain.advance_block().await.unwrap(), 101);
        assert_eq!(chain.block(101).unwrap().number, 101);
        assert!(chain.block(99).is_none());
    }

    #[test]
    fn test_credentials_follow_seed() {
        let a = SimulatedChain::new(SimulatedChainConfig::default().with_seed(9));
        let b = SimulatedChain::new(SimulatedChainConfig::default().with_seed(9));
        assert_eq!(a.new_credential().address(), b.new_credential().address());
        assert_eq!(a.seed(), 9);
    }
}
