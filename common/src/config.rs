use lazy_static::lazy_static;
use primitive_types::U256;

// Package version plus short commit hash
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

// Token metadata
pub const TOKEN_NAME: &str = "WEMIX TOKEN";
pub const TOKEN_SYMBOL: &str = "WEMIX";
pub const TOKEN_DECIMALS: u8 = 18;

// Staking rules
// A stake can only be withdrawn once this many blocks have passed since it
// was created (90 days of 1s blocks)
pub const MIN_BLOCK_WAITING_WITHDRAWAL: u64 = 7_776_000;

// Minting rules
// One mint call credits at most this many block rounds, the rest stays pending
pub const MAX_TIMES_MINTING_ONCE: u64 = 50;
// Per round amounts, in the smallest token unit (18 decimals)
pub const MINT_TO_PARTNER: u64 = 500_000_000_000_000_000; // 0.5 token
pub const MINT_TO_ECO_FUND: u64 = 250_000_000_000_000_000; // 0.25 token
pub const MINT_TO_WEMIX: u64 = 250_000_000_000_000_000; // 0.25 token

lazy_static! {
    // 1 billion tokens
    pub static ref INITIAL_SUPPLY: U256 = U256::exp10(27);
    // 5 million tokens locked by a single stake
    pub static ref UNIT_STAKING: U256 = U256::from(5u64) * U256::exp10(24);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supply_constants() {
        assert_eq!(
            *INITIAL_SUPPLY,
            U256::from_dec_str("1000000000000000000000000000").unwrap()
        );
        assert_eq!(
            *UNIT_STAKING,
            U256::from_dec_str("5000000000000000000000000").unwrap()
        );
        assert_eq!(MINT_TO_ECO_FUND + MINT_TO_WEMIX, MINT_TO_PARTNER);
    }
}
