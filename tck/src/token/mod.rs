//! Reference staking token that runs inside the simulated chain.

mod partner_token;

use std::sync::Arc;

use stakemint_common::abi::{AbiError, MethodTable};

pub use partner_token::PartnerToken;

use crate::contract::ContractArtifact;

/// JSON ABI document of [`PartnerToken`].
pub const PARTNER_TOKEN_ABI: &str = include_str!("abi.json");

/// Artifact version reported in deployment logs.
pub const PARTNER_TOKEN_VERSION: &str = "1.0.0";

/// Pre-built artifact for the reference token.
pub fn partner_token_artifact() -> Result<ContractArtifact, AbiError> {
    let table = Arc::new(MethodTable::from_json(PARTNER_TOKEN_ABI)?);
    let template = Arc::new(PartnerToken::new(Arc::clone(&table)));
    Ok(ContractArtifact::new(
        "PartnerToken",
        PARTNER_TOKEN_VERSION,
        table,
        template,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{CallEnv, ContractCode};
    use primitive_types::U256;
    use stakemint_common::{
        abi::AbiValue,
        config::{INITIAL_SUPPLY, UNIT_STAKING},
        crypto::{Address, Hash},
    };

    struct Harness {
        table: Arc<MethodTable>,
        token: Box<dyn ContractCode>,
        this: Address,
    }

    const OWNER: u64 = 1;
    const ECO_FUND: u64 = 2;
    const WEMIX: u64 = 3;
    const PARTNER: u64 = 4;

    impl Harness {
        fn deploy(height: u64) -> Self {
            let artifact = partner_token_artifact().unwrap();
            let table = Arc::clone(artifact.table());
            let mut token = artifact.instantiate();
            let this = Address::from_low_u64(100);
            let args = table
                .constructor()
                .encode(&[
                    Address::from_low_u64(ECO_FUND).into(),
                    Address::from_low_u64(WEMIX).into(),
                ])
                .unwrap();
            let mut env = CallEnv::new(Address::from_low_u64(OWNER), this, height, false);
            token.construct(&mut env, &args).unwrap();
            Self { table, token, this }
        }

        fn run(
            &mut self,
            sender: u64,
            height: u64,
            method: &str,
            args: &[AbiValue],
        ) -> anyhow::Result<(Vec<AbiValue>, CallEnv)> {
            let method = self.table.method(method).unwrap();
            let mut env = CallEnv::new(Address::from_low_u64(sender), self.this, height, false);
            let out = self.token.invoke(&mut env, &method.encode_call(args).unwrap())?;
            Ok((method.decode_output(&out).unwrap(), env))
        }

        fn uint(&mut self, height: u64, method: &str, args: &[AbiValue]) -> U256 {
            let (values, _) = self.run(0, height, method, args).unwrap();
            values[0].as_uint().unwrap()
        }

        fn balance(&mut self, height: u64, who: u64) -> U256 {
            self.uint(height, "balanceOf", &[Address::from_low_u64(who).into()])
        }
    }

    #[test]
    fn test_constructor_state() {
        let mut h = Harness::deploy(5);
        assert_eq!(h.uint(5, "totalSupply", &[]), *INITIAL_SUPPLY);
        assert_eq!(h.balance(5, OWNER), *INITIAL_SUPPLY);
        assert_eq!(h.uint(5, "blockToMint", &[]), U256::from(5u64));
        assert_eq!(h.uint(9, "pendingBlock", &[]), U256::from(4u64));
    }

    #[test]
    fn test_stake_requires_allowance() {
        let mut h = Harness::deploy(1);
        let err = h
            .run(OWNER, 2, "stake", &[U256::zero().into()])
            .unwrap_err();
        assert!(format!("{:#}", err).contains("not allowed"));

        h.run(OWNER, 3, "addAllowedPartner", &[Address::from_low_u64(PARTNER).into()])
            .unwrap();
        let (_, env) = h
            .run(
                OWNER,
                4,
                "stakeDelegated",
                &[Address::from_low_u64(PARTNER).into(), U256::zero().into()],
            )
            .unwrap();

        // transfer into the contract, then the stake itself
        assert_eq!(env.logs().len(), 2);
        let staked = &env.logs()[1];
        assert_eq!(staked.topics[1], Hash::from(Address::from_low_u64(PARTNER)));
        assert_eq!(staked.topics[2], Hash::from(Address::from_low_u64(OWNER)));
        assert_eq!(h.uint(4, "partnersNumber", &[]), U256::one());
        assert_eq!(h.balance(4, 100), *UNIT_STAKING);

        // the grant was consumed
        assert!(h
            .run(
                OWNER,
                5,
                "stakeDelegated",
                &[Address::from_low_u64(PARTNER).into(), U256::zero().into()],
            )
            .is_err());
    }

    #[test]
    fn test_withdraw_boundary() {
        let mut h = Harness::deploy(1);
        h.run(OWNER, 2, "change_minBlockWaitingWithdrawal", &[U256::from(10u64).into()])
            .unwrap();
        h.run(OWNER, 3, "addAllowedPartner", &[Address::from_low_u64(PARTNER).into()])
            .unwrap();
        h.run(
            OWNER,
            4,
            "stakeDelegated",
            &[Address::from_low_u64(PARTNER).into(), U256::from(3u64).into()],
        )
        .unwrap();

        let (record, _) = h.run(0, 4, "partnerBySerial", &[U256::one().into()]).unwrap();
        assert_eq!(record[4].as_uint(), Some(U256::from(10u64)));

        assert!(h.run(OWNER, 13, "withdraw", &[U256::one().into()]).is_err());
        assert!(h.run(PARTNER, 14, "withdraw", &[U256::one().into()]).is_err());
        h.run(OWNER, 14, "withdraw", &[U256::one().into()]).unwrap();
        assert_eq!(h.uint(14, "partnersNumber", &[]), U256::zero());
        assert_eq!(h.balance(14, OWNER), *INITIAL_SUPPLY);
    }

    #[test]
    fn test_mint_caps_rounds() {
        let mut h = Harness::deploy(0);
        h.run(OWNER, 1, "change_maxTimesMintingOnce", &[U256::from(3u64).into()])
            .unwrap();
        h.run(7, 10, "mint", &[]).unwrap();

        assert_eq!(h.uint(10, "blockToMint", &[]), U256::from(3u64));
        let per_round = U256::from(stakemint_common::config::MINT_TO_ECO_FUND);
        assert_eq!(h.balance(10, ECO_FUND), per_round * U256::from(3u64));
        assert_eq!(h.balance(10, PARTNER), U256::zero());
    }

    #[test]
    fn test_mint_overflow_reverts() {
        let mut h = Harness::deploy(0);
        h.run(OWNER, 1, "change_mintToPartner", &[U256::MAX.into()])
            .unwrap();
        h.run(OWNER, 2, "addAllowedPartner", &[Address::from_low_u64(PARTNER).into()])
            .unwrap();
        h.run(
            OWNER,
            3,
            "stakeDelegated",
            &[Address::from_low_u64(PARTNER).into(), U256::zero().into()],
        )
        .unwrap();

        let err = h.run(7, 10, "mint", &[]).unwrap_err();
        assert!(format!("{:#}", err).contains("overflow"));
        assert_eq!(h.uint(10, "totalSupply", &[]), *INITIAL_SUPPLY);
        assert_eq!(h.balance(10, PARTNER), U256::zero());
        assert_eq!(h.uint(10, "blockToMint", &[]), U256::zero());
    }

    #[test]
    fn test_owner_only_setters() {
        let mut h = Harness::deploy(0);
        let err = h
            .run(PARTNER, 1, "change_mintToPartner", &[U256::one().into()])
            .unwrap_err();
        assert!(format!("{:#}", err).contains("caller is not the owner"));
    }
}
