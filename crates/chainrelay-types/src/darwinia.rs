//! The Darwinia runtime type table.
//!
//! Field order, integer widths, compact flags, variant order and array
//! lengths below are the chain's binary layout. Do not reorder anything
//! without a matching runtime upgrade.

use crate::error::RegistryError;
use crate::primitive::PrimitiveKind;
use crate::registry::{RegistryBuilder, TypeRegistry};

/// Build and validate the full Darwinia registry (base layer + chain types).
pub fn registry() -> Result<TypeRegistry, RegistryError> {
    let mut b = RegistryBuilder::new();
    builtins(&mut b);
    chain_types(&mut b);
    b.build()
}

/// Substrate / Ethereum base types the chain table builds on.
pub fn builtins(b: &mut RegistryBuilder) {
    b.primitive("Balance", PrimitiveKind::U128)
        .primitive("Moment", PrimitiveKind::U64)
        .primitive("BlockNumber", PrimitiveKind::U32)
        .alias("Hash", "H256")
        .fixed_array("AccountId", "u8", 32)
        .fixed_array("LockIdentifier", "u8", 8)
        .alias("EthereumAddress", "H160")
        .alias("EraIndex", "u32")
        .structure(
            "UnlockChunk",
            &[("value", "Compact<Balance>"), ("era", "Compact<EraIndex>")],
        )
        .structure(
            "LogEntry",
            &[("address", "H160"), ("topics", "Vec<H256>"), ("data", "Bytes")],
        )
        .enumeration(
            "TransactionOutcome",
            &[
                ("Unknown", None),
                ("StateRoot", Some("H256")),
                ("StatusCode", Some("u8")),
            ],
        );
}

/// Darwinia's custom types.
pub fn chain_types(b: &mut RegistryBuilder) {
    // balances & staking
    b.alias("RingBalance", "Balance")
        .alias("KtonBalance", "Balance")
        .alias("MomentT", "Moment")
        .alias("Power", "u32")
        .alias("DepositId", "U256")
        .alias("StakingBalanceT", "StakingBalance")
        .enumeration(
            "StakingBalance",
            &[
                ("All", None),
                ("RingBalance", Some("Balance")),
                ("KtonBalance", Some("Balance")),
            ],
        )
        .alias("StakingLedgerT", "StakingLedger")
        .structure(
            "StakingLedger",
            &[
                ("stash", "AccountId"),
                ("active_ring", "Compact<Balance>"),
                ("active_deposit_ring", "Compact<Balance>"),
                ("active_kton", "Compact<Balance>"),
                ("deposit_items", "Vec<TimeDepositItem>"),
                ("ring_staking_lock", "StakingLock"),
                ("kton_staking_lock", "StakingLock"),
                ("total", "Compact<Balance>"),
                ("active", "Compact<Balance>"),
                ("unlocking", "Vec<UnlockChunk>"),
            ],
        )
        .structure(
            "TimeDepositItem",
            &[
                ("value", "Compact<Balance>"),
                ("start_time", "Compact<Moment>"),
                ("expire_time", "Compact<Moment>"),
            ],
        )
        .enumeration(
            "RewardDestination",
            &[("Staked", Some("Staked")), ("Stash", None), ("Controller", None)],
        )
        .structure("Staked", &[("promise_month", "Moment")])
        .structure(
            "Exposure",
            &[
                ("own_ring_balance", "Compact<Balance>"),
                ("own_kton_balance", "Compact<Balance>"),
                ("own_power", "Power"),
                ("total_power", "Power"),
                ("others", "Vec<IndividualExposure>"),
            ],
        )
        .structure(
            "IndividualExposure",
            &[
                ("who", "AccountId"),
                ("ring_balance", "Compact<Balance>"),
                ("kton_balance", "Compact<Balance>"),
                ("power", "Power"),
            ],
        )
        .structure(
            "ValidatorReward",
            &[
                ("who", "AccountId"),
                ("amount", "Compact<Balance>"),
                ("nominators_reward", "Vec<NominatorReward>"),
            ],
        )
        .structure(
            "NominatorReward",
            &[("who", "AccountId"), ("amount", "Compact<Balance>")],
        )
        .alias("RKT", "RK")
        .structure("RK", &[("r", "Balance"), ("k", "Balance")]);

    // locks
    b.structure(
        "BalanceLock",
        &[
            ("id", "LockIdentifier"),
            ("lock_for", "LockFor"),
            ("lock_reasons", "LockReasons"),
        ],
    )
    .enumeration(
        "LockFor",
        &[("Common", Some("Common")), ("Staking", Some("StakingLock"))],
    )
    .structure("Common", &[("amount", "Balance")])
    .structure(
        "StakingLock",
        &[("staking_amount", "Balance"), ("unbondings", "Vec<Unbonding>")],
    )
    .enumeration("LockReasons", &[("Fee", None), ("Misc", None), ("All", None)])
    .structure("Unbonding", &[("amount", "Balance"), ("moment", "BlockNumber")])
    .structure(
        "AccountData",
        &[
            ("free_ring", "Balance"),
            ("free_kton", "Balance"),
            ("reserved_ring", "Balance"),
            ("reserved_kton", "Balance"),
            ("free", "Balance"),
            ("reserved", "Balance"),
            ("misc_frozen", "Balance"),
            ("fee_frozen", "Balance"),
        ],
    );

    // ethereum bridge
    b.alias("EthBlockNumber", "u64")
        .alias("EthAddress", "H160")
        .alias("EthTransactionIndex", "(H256, u64)")
        .structure(
            "HeaderInfo",
            &[
                ("total_difficulty", "U256"),
                ("parent_hash", "H256"),
                ("number", "EthBlockNumber"),
            ],
        )
        .structure(
            "EthHeader",
            &[
                ("parent_hash", "H256"),
                ("timestamp", "u64"),
                ("number", "EthBlockNumber"),
                ("auth", "EthAddress"),
                ("transaction_root", "H256"),
                ("uncles_hash", "H256"),
                ("extra_data", "Bytes"),
                ("state_root", "H256"),
                ("receipts_root", "H256"),
                ("log_bloom", "Bloom"),
                ("gas_used", "U256"),
                ("gas_limit", "U256"),
                ("difficulty", "U256"),
                ("seal", "Vec<Bytes>"),
                ("hash", "Option<H256>"),
            ],
        )
        .fixed_array("Bloom", "u8", 256)
        .structure(
            "Receipt",
            &[
                ("gas_used", "U256"),
                ("log_bloom", "Bloom"),
                ("logs", "Vec<LogEntry>"),
                ("outcome", "TransactionOutcome"),
            ],
        )
        .structure(
            "EthReceiptProof",
            &[("index", "u64"), ("proof", "Bytes"), ("header_hash", "H256")],
        )
        .enumeration(
            "RedeemFor",
            &[
                ("Ring", Some("EthReceiptProof")),
                ("Kton", Some("EthReceiptProof")),
                ("Deposit", Some("EthReceiptProof")),
            ],
        );

    // cross-chain claims
    b.fixed_array("AddressT", "u8", 20)
        .alias("TronAddress", "EthereumAddress")
        .fixed_array("EcdsaSignature", "u8", 65)
        .enumeration(
            "OtherSignature",
            &[
                ("Dot", Some("EcdsaSignature")),
                ("Eth", Some("EcdsaSignature")),
                ("Tron", Some("EcdsaSignature")),
            ],
        )
        .enumeration(
            "OtherAddress",
            &[
                ("Dot", Some("EthereumAddress")),
                ("Eth", Some("EthereumAddress")),
                ("Tron", Some("EthereumAddress")),
            ],
        );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn darwinia_registry_validates() {
        let reg = registry().unwrap();
        assert!(reg.len() > 40);
        reg.validate().unwrap();
    }

    #[test]
    fn chain_types_need_builtins() {
        let mut b = RegistryBuilder::new();
        chain_types(&mut b);
        assert!(matches!(
            b.build().unwrap_err(),
            RegistryError::DanglingReference { .. }
        ));
    }
}
