use soroban_sdk::xdr::{AccountId, Asset};

use crate::errors::AdaptorError;
use crate::ledger::{LedgerEntry, LedgerKey, LedgerRead, LedgerTxn};

/// Lookup key of an allowance: at most one record per triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AllowanceKey {
    pub owner: AccountId,
    pub spender: AccountId,
    pub asset: Asset,
}

/// Amount `spender` may move out of `owner`'s holdings of `asset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceRecord {
    /// Reserved for future fields; always 0.
    pub extension_version: i32,
    pub owner: AccountId,
    pub spender: AccountId,
    pub asset: Asset,
    pub amount: i64,
}

impl AllowanceRecord {
    pub fn key(&self) -> AllowanceKey {
        AllowanceKey {
            owner: self.owner.clone(),
            spender: self.spender.clone(),
            asset: self.asset.clone(),
        }
    }
}

/// Current allowance, `0` when no record exists.
pub fn read_allowance<L: LedgerRead + ?Sized>(
    ledger: &L,
    owner: &AccountId,
    spender: &AccountId,
    asset: &Asset,
) -> i64 {
    let key = LedgerKey::Allowance(AllowanceKey {
        owner: owner.clone(),
        spender: spender.clone(),
        asset: asset.clone(),
    });
    match ledger.load(&key) {
        Some(LedgerEntry::Allowance(record)) => record.amount,
        _ => 0,
    }
}

/// Replace the allowance for the key. A zero amount removes the record.
pub fn write_allowance(
    ltx: &mut LedgerTxn<'_>,
    owner: &AccountId,
    spender: &AccountId,
    asset: &Asset,
    amount: i64,
) -> Result<(), AdaptorError> {
    if amount < 0 {
        return Err(AdaptorError::StorageInconsistency(format!(
            "allowance amount {} is negative",
            amount
        )));
    }

    let record = AllowanceRecord {
        extension_version: 0,
        owner: owner.clone(),
        spender: spender.clone(),
        asset: asset.clone(),
        amount,
    };

    if amount > 0 {
        ltx.put(LedgerEntry::Allowance(record));
    } else {
        ltx.erase(LedgerKey::Allowance(record.key()));
    }
    Ok(())
}
