use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, bail, ensure, Context};
use lazy_static::lazy_static;
use primitive_types::U256;
use stakemint_common::{
    abi::{field, AbiValue, Method, MethodTable},
    config::{
        INITIAL_SUPPLY, MAX_TIMES_MINTING_ONCE, MINT_TO_ECO_FUND, MINT_TO_PARTNER, MINT_TO_WEMIX,
        MIN_BLOCK_WAITING_WITHDRAWAL, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL, UNIT_STAKING,
    },
    crypto::{keccak256, Address, Hash},
};

use crate::chain::{CallEnv, ContractCode};

lazy_static! {
    static ref TRANSFER_EVENT: Hash = keccak256(b"Transfer(address,address,uint256)");
    static ref OWNERSHIP_EVENT: Hash = keccak256(b"OwnershipTransferred(address,address)");
    static ref STAKED_EVENT: Hash = keccak256(b"Staked(address,address,uint256)");
    static ref WITHDRAWN_EVENT: Hash = keccak256(b"Withdrawn(address,address,uint256)");
    static ref MINTED_EVENT: Hash = keccak256(b"Minted(uint256,uint256,uint256)");
}

fn uint_topic(value: U256) -> Hash {
    Hash::new(value.to_big_endian())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PartnerStake {
    serial: U256,
    partner: Address,
    payer: Address,
    block_staking: U256,
    block_waiting_withdrawal: U256,
    balance_staking: U256,
}

impl PartnerStake {
    fn to_values(&self) -> Vec<AbiValue> {
        vec![
            self.serial.into(),
            self.partner.into(),
            self.payer.into(),
            self.block_staking.into(),
            self.block_waiting_withdrawal.into(),
            self.balance_staking.into(),
        ]
    }
}

/// Token with delegated staking and round-robin block minting.
///
/// Every stake locks exactly `unitStaking` from the payer into the
/// contract's own balance. Each minted block credits `mintToPartner` to the
/// partner under the cursor plus fixed amounts to the two treasuries.
#[derive(Debug, Clone)]
pub struct PartnerToken {
    table: Arc<MethodTable>,
    owner: Address,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    unit_staking: U256,
    min_block_waiting_withdrawal: U256,
    max_times_minting_once: U256,
    eco_fund: Address,
    wemix: Address,
    mint_to_partner: U256,
    mint_to_eco_fund: U256,
    mint_to_wemix: U256,
    next_partner_to_mint: U256,
    block_to_mint: u64,
    // remaining stake grants per partner
    allowed_partners: HashMap<Address, u64>,
    partners: Vec<PartnerStake>,
    last_serial: U256,
}

impl PartnerToken {
    pub fn new(table: Arc<MethodTable>) -> Self {
        Self {
            table,
            owner: Address::zero(),
            total_supply: U256::zero(),
            balances: HashMap::new(),
            unit_staking: *UNIT_STAKING,
            min_block_waiting_withdrawal: U256::from(MIN_BLOCK_WAITING_WITHDRAWAL),
            max_times_minting_once: U256::from(MAX_TIMES_MINTING_ONCE),
            eco_fund: Address::zero(),
            wemix: Address::zero(),
            mint_to_partner: U256::from(MINT_TO_PARTNER),
            mint_to_eco_fund: U256::from(MINT_TO_ECO_FUND),
            mint_to_wemix: U256::from(MINT_TO_WEMIX),
            next_partner_to_mint: U256::zero(),
            block_to_mint: 0,
            allowed_partners: HashMap::new(),
            partners: Vec::new(),
            last_serial: U256::zero(),
        }
    }

    fn event_data(&self, event: &str, values: &[AbiValue]) -> anyhow::Result<Vec<u8>> {
        Ok(self.table.event(event)?.encode_data(values)?)
    }

    fn balance_of(&self, who: &Address) -> U256 {
        self.balances.get(who).copied().unwrap_or_default()
    }

    fn only_owner(&self, env: &CallEnv) -> anyhow::Result<()> {
        ensure!(env.sender == self.owner, "caller is not the owner");
        Ok(())
    }

    fn move_tokens(
        &mut self,
        env: &mut CallEnv,
        from: Address,
        to: Address,
        value: U256,
    ) -> anyhow::Result<()> {
        let available = self.balance_of(&from);
        ensure!(
            available >= value,
            "insufficient balance: have {}, need {}",
            available,
            value
        );
        self.balances.insert(from, available - value);
        // supply bounds every balance, so the receiver cannot overflow
        let credited = self.balance_of(&to) + value;
        self.balances.insert(to, credited);
        let data = self.event_data("Transfer", &[value.into()])?;
        env.emit(vec![*TRANSFER_EVENT, from.into(), to.into()], data)
    }

    fn credit(&mut self, to: Address, value: U256) -> anyhow::Result<()> {
        let supply = self
            .total_supply
            .checked_add(value)
            .ok_or_else(|| anyhow!("total supply overflow"))?;
        let credited = self
            .balance_of(&to)
            .checked_add(value)
            .ok_or_else(|| anyhow!("balance overflow"))?;
        self.balances.insert(to, credited);
        self.total_supply = supply;
        Ok(())
    }

    fn stake_for(
        &mut self,
        env: &mut CallEnv,
        partner: Address,
        wait_block: U256,
    ) -> anyhow::Result<()> {
        let grants = self.allowed_partners.get(&partner).copied().unwrap_or(0);
        ensure!(grants > 0, "partner {} is not allowed to stake", partner);

        let payer = env.sender;
        let this = env.this;
        let amount = self.unit_staking;
        self.move_tokens(env, payer, this, amount)?;

        if grants == 1 {
            self.allowed_partners.remove(&partner);
        } else {
            self.allowed_partners.insert(partner, grants - 1);
        }

        self.last_serial = self.last_serial.saturating_add(U256::one());
        let record = PartnerStake {
            serial: self.last_serial,
            partner,
            payer,
            block_staking: U256::from(env.block_number),
            block_waiting_withdrawal: wait_block.max(self.min_block_waiting_withdrawal),
            balance_staking: amount,
        };
        env.emit(
            vec![
                *STAKED_EVENT,
                partner.into(),
                payer.into(),
                uint_topic(record.serial),
            ],
            Vec::new(),
        )?;
        self.partners.push(record);
        Ok(())
    }

    fn withdraw(&mut self, env: &mut CallEnv, serial: U256) -> anyhow::Result<()> {
        let index = self
            .partners
            .iter()
            .position(|p| p.serial == serial)
            .ok_or_else(|| anyhow!("unknown serial {}", serial))?;
        let record = self.partners[index].clone();

        ensure!(env.sender == record.payer, "caller is not the payer");
        let withdrawable_at = record
            .block_staking
            .saturating_add(record.block_waiting_withdrawal);
        ensure!(
            U256::from(env.block_number) >= withdrawable_at,
            "stake {} is locked until block {}",
            serial,
            withdrawable_at
        );

        let this = env.this;
        self.move_tokens(env, this, record.payer, record.balance_staking)?;
        self.partners.swap_remove(index);
        env.emit(
            vec![
                *WITHDRAWN_EVENT,
                record.partner.into(),
                record.payer.into(),
                uint_topic(serial),
            ],
            Vec::new(),
        )
    }

    fn mint(&mut self, env: &mut CallEnv) -> anyhow::Result<()> {
        let pending = env.block_number.saturating_sub(self.block_to_mint);
        let rounds = U256::from(pending).min(self.max_times_minting_once).low_u64();
        if rounds == 0 {
            return Ok(());
        }

        let supply_before = self.total_supply;
        for _ in 0..rounds {
            if !self.partners.is_empty() {
                if self.next_partner_to_mint >= U256::from(self.partners.len()) {
                    self.next_partner_to_mint = U256::zero();
                }
                let partner = self.partners[self.next_partner_to_mint.low_u64() as usize].partner;
                self.credit(partner, self.mint_to_partner)?;
                self.next_partner_to_mint = self.next_partner_to_mint.saturating_add(U256::one());
            }
            self.credit(self.eco_fund, self.mint_to_eco_fund)?;
            self.credit(self.wemix, self.mint_to_wemix)?;
        }

        let from = self.block_to_mint;
        self.block_to_mint = from.saturating_add(rounds);
        let data = self.event_data(
            "Minted",
            &[
                U256::from(from).into(),
                U256::from(self.block_to_mint).into(),
                (self.total_supply - supply_before).into(),
            ],
        )?;
        env.emit(vec![*MINTED_EVENT], data)
    }

    fn partner_at(&self, index: U256) -> anyhow::Result<&PartnerStake> {
        if index >= U256::from(self.partners.len()) {
            bail!("partner index {} out of range", index);
        }
        Ok(&self.partners[index.low_u64() as usize])
    }

    fn dispatch(
        &mut self,
        env: &mut CallEnv,
        method: &Method,
        args: &[AbiValue],
    ) -> anyhow::Result<Vec<AbiValue>> {
        let out: Vec<AbiValue> = match method.name.as_str() {
            "name" => vec![TOKEN_NAME.into()],
            "symbol" => vec![TOKEN_SYMBOL.into()],
            "decimals" => vec![TOKEN_DECIMALS.into()],
            "totalSupply" => vec![self.total_supply.into()],
            "balanceOf" => vec![self.balance_of(&field(args, 0)?).into()],
            "owner" => vec![self.owner.into()],
            "unitStaking" => vec![self.unit_staking.into()],
            "minBlockWaitingWithdrawal" => vec![self.min_block_waiting_withdrawal.into()],
            "maxTimesMintingOnce" => vec![self.max_times_minting_once.into()],
            "ecoFund" => vec![self.eco_fund.into()],
            "wemix" => vec![self.wemix.into()],
            "mintToPartner" => vec![self.mint_to_partner.into()],
            "mintToEcoFund" => vec![self.mint_to_eco_fund.into()],
            "mintToWemix" => vec![self.mint_to_wemix.into()],
            "nextPartnerToMint" => vec![self.next_partner_to_mint.into()],
            "blockToMint" => vec![self.block_to_mint.into()],
            "pendingBlock" => vec![env.block_number.saturating_sub(self.block_to_mint).into()],
            "partnersNumber" => vec![U256::from(self.partners.len()).into()],
            "partnerByIndex" => self.partner_at(field(args, 0)?)?.to_values(),
            "partnerBySerial" => {
                let serial: U256 = field(args, 0)?;
                self.partners
                    .iter()
                    .find(|p| p.serial == serial)
                    .ok_or_else(|| anyhow!("unknown serial {}", serial))?
                    .to_values()
            }
            "transfer" => {
                let to: Address = field(args, 0)?;
                ensure!(!to.is_zero(), "transfer to the zero address");
                let sender = env.sender;
                self.move_tokens(env, sender, to, field(args, 1)?)?;
                vec![true.into()]
            }
            "transferOwnership" => {
                self.only_owner(env)?;
                let new_owner: Address = field(args, 0)?;
                ensure!(!new_owner.is_zero(), "new owner is the zero address");
                env.emit(
                    vec![*OWNERSHIP_EVENT, self.owner.into(), new_owner.into()],
                    Vec::new(),
                )?;
                self.owner = new_owner;
                Vec::new()
            }
            "change_unitStaking" => {
                self.only_owner(env)?;
                self.unit_staking = field(args, 0)?;
                Vec::new()
            }
            "change_minBlockWaitingWithdrawal" => {
                self.only_owner(env)?;
                self.min_block_waiting_withdrawal = field(args, 0)?;
                Vec::new()
            }
            "change_maxTimesMintingOnce" => {
                self.only_owner(env)?;
                self.max_times_minting_once = field(args, 0)?;
                Vec::new()
            }
            "change_ecoFund" => {
                self.only_owner(env)?;
                self.eco_fund = field(args, 0)?;
                Vec::new()
            }
            "change_wemix" => {
                self.only_owner(env)?;
                self.wemix = field(args, 0)?;
                Vec::new()
            }
            "change_mintToPartner" => {
                self.only_owner(env)?;
                self.mint_to_partner = field(args, 0)?;
                Vec::new()
            }
            "change_mintToEcoFund" => {
                self.only_owner(env)?;
                self.mint_to_eco_fund = field(args, 0)?;
                Vec::new()
            }
            "change_mintToWemix" => {
                self.only_owner(env)?;
                self.mint_to_wemix = field(args, 0)?;
                Vec::new()
            }
            "addAllowedPartner" => {
                self.only_owner(env)?;
                let partner: Address = field(args, 0)?;
                *self.allowed_partners.entry(partner).or_insert(0) += 1;
                Vec::new()
            }
            "stake" => {
                let partner = env.sender;
                self.stake_for(env, partner, field(args, 0)?)?;
                Vec::new()
            }
            "stakeDelegated" => {
                self.stake_for(env, field(args, 0)?, field(args, 1)?)?;
                Vec::new()
            }
            "withdraw" => {
                self.withdraw(env, field(args, 0)?)?;
                Vec::new()
            }
            "mint" => {
                self.mint(env)?;
                Vec::new()
            }
            other => bail!("method {} is not implemented", other),
        };
        Ok(out)
    }
}

impl ContractCode for PartnerToken {
    fn name(&self) -> &str {
        "PartnerToken"
    }

    fn construct(&mut self, env: &mut CallEnv, args: &[u8]) -> anyhow::Result<()> {
        let values = self
            .table
            .constructor()
            .decode(args)
            .context("decoding constructor arguments")?;
        self.eco_fund = field(&values, 0)?;
        self.wemix = field(&values, 1)?;
        self.owner = env.sender;
        self.block_to_mint = env.block_number;
        self.credit(env.sender, *INITIAL_SUPPLY)
    }

    fn invoke(&mut self, env: &mut CallEnv, input: &[u8]) -> anyhow::Result<Vec<u8>> {
        let table = Arc::clone(&self.table);
        let method = table.method_for_call(input)?;
        let args = method.decode_call(input)?;
        let out = self
            .dispatch(env, method, &args)
            .with_context(|| format!("PartnerToken.{}", method.name))?;
        Ok(method.encode_output(&out)?)
    }

    fn snapshot(&self) -> Box<dyn ContractCode> {
        Box::new(self.clone())
    }
}
