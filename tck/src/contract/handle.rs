use primitive_types::U256;
use stakemint_common::{
    abi::{AbiValue, FromAbiValues, Method},
    crypto::{Address, Hash, KeyPair},
    receipt::{Log, Receipt},
};

use super::ContractArtifact;
use crate::{
    chain::ExecutionClient,
    error::{HarnessError, HarnessResult},
};

/// A method table bound to one deployed contract instance.
///
/// The handle owns the execution client so every call and every
/// transaction made through it sees a single, sequential chain.
pub struct ContractHandle<C: ExecutionClient> {
    client: C,
    artifact: ContractArtifact,
    address: Address,
    owner_key: KeyPair,
    block_deployed: u64,
    constructor_args: Vec<AbiValue>,
}

impl<C: ExecutionClient> ContractHandle<C> {
    /// Deploy `artifact` from `owner_key` and bind a handle to it.
    pub async fn deploy(
        mut client: C,
        artifact: ContractArtifact,
        owner_key: KeyPair,
        constructor_args: Vec<AbiValue>,
    ) -> HarnessResult<Self> {
        let encoded = artifact.table().constructor().encode(&constructor_args)?;
        let (address, block_deployed) = client
            .deploy(&owner_key, artifact.instantiate(), encoded)
            .await
            .map_err(|e| HarnessError::Deployment(e.to_string()))?;

        log::info!("contract name: {}", artifact.name());
        log::info!("contract version: {}", artifact.version());
        log::info!("contract methods: {}", artifact.table().len());
        log::info!(
            "ok > contract address deployed {} (block {})",
            address,
            block_deployed
        );

        Ok(Self {
            client,
            artifact,
            address,
            owner_key,
            block_deployed,
            constructor_args,
        })
    }

    fn method(&self, name: &str) -> HarnessResult<&Method> {
        Ok(self.artifact.table().method(name)?)
    }

    /// Read-only call decoded into `T`.
    pub async fn call<T: FromAbiValues>(&self, method: &str, args: &[AbiValue]) -> HarnessResult<T> {
        let values = self.low_call(method, args).await?;
        Ok(T::from_abi_values(values)?)
    }

    /// Read-only call returning the raw ordered values.
    pub async fn low_call(&self, method: &str, args: &[AbiValue]) -> HarnessResult<Vec<AbiValue>> {
        let m = self.method(method)?;
        let data = m.encode_call(args)?;
        let out = self
            .client
            .call(&self.address, &data)
            .await
            .map_err(|e| HarnessError::from_client(method, e))?;
        Ok(m.decode_output(&out)?)
    }

    /// Sign and submit a state-changing call, producing exactly one block.
    ///
    /// Signs with the owner credential when `key` is `None`. A receipt with
    /// status 0 is returned as-is.
    pub async fn execute(
        &mut self,
        key: Option<&KeyPair>,
        method: &str,
        args: &[AbiValue],
    ) -> HarnessResult<Receipt> {
        let data = self.method(method)?.encode_call(args)?;
        let key = key.unwrap_or(&self.owner_key);
        let receipt = self
            .client
            .execute(&self.address, key, data)
            .await
            .map_err(|e| HarnessError::from_client(method, e))?;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!(
                "execute {} by {} -> status {} (block {})",
                method,
                key.address(),
                receipt.status,
                receipt.block_number
            );
        }
        Ok(receipt)
    }

    /// Produce one empty block.
    pub async fn commit_block(&mut self) -> HarnessResult<u64> {
        self.client
            .advance_block()
            .await
            .map_err(|e| HarnessError::Transport(e.to_string()))
    }

    pub fn current_block_height(&self) -> u64 {
        self.client.current_block_height()
    }

    /// Token balance of `who`, read through `balanceOf`.
    pub async fn balance_of(&self, who: &Address) -> HarnessResult<U256> {
        self.call("balanceOf", &[(*who).into()]).await
    }

    /// topic[0] of the named event.
    pub fn event_id(&self, event: &str) -> HarnessResult<Hash> {
        Ok(self.artifact.table().event(event)?.id())
    }

    /// Logs of `receipt` emitted by this contract for `event`.
    pub fn logs_of<'r>(&self, receipt: &'r Receipt, event: &str) -> HarnessResult<Vec<&'r Log>> {
        let id = self.event_id(event)?;
        Ok(receipt
            .logs
            .iter()
            .filter(|log| log.address == self.address && log.is_event(&id))
            .collect())
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Address of the deploying credential.
    pub fn owner(&self) -> Address {
        self.owner_key.address()
    }

    pub fn owner_key(&self) -> &KeyPair {
        &self.owner_key
    }

    pub fn block_deployed(&self) -> u64 {
        self.block_deployed
    }

    pub fn constructor_args(&self) -> &[AbiValue] {
        &self.constructor_args
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    /// Fresh, unfunded credential from the client.
    pub fn new_credential(&self) -> KeyPair {
        self.client.new_credential()
    }
}
