use soroban_sdk::xdr::{AccountId, Asset};

use crate::ledger::{AccountEntry, LedgerEntry, LedgerKey, LedgerRead, TrustLineEntry};

pub fn load_account<L: LedgerRead + ?Sized>(
    ledger: &L,
    account: &AccountId,
) -> Option<AccountEntry> {
    match ledger.load(&LedgerKey::Account(account.clone())) {
        Some(LedgerEntry::Account(entry)) => Some(entry),
        _ => None,
    }
}

pub fn load_trustline<L: LedgerRead + ?Sized>(
    ledger: &L,
    account: &AccountId,
    asset: &Asset,
) -> Option<TrustLineEntry> {
    let key = LedgerKey::Trustline {
        account_id: account.clone(),
        asset: asset.clone(),
    };
    match ledger.load(&key) {
        Some(LedgerEntry::Trustline(entry)) => Some(entry),
        _ => None,
    }
}

/// Spendable amount of `asset` held by `account`.
///
/// Native assets read the account balance; issued assets read the trustline.
/// A missing account or trustline reads as `0`.
pub fn read_balance<L: LedgerRead + ?Sized>(ledger: &L, account: &AccountId, asset: &Asset) -> i64 {
    match asset {
        Asset::Native => load_account(ledger, account).map_or(0, |a| a.balance),
        _ => load_trustline(ledger, account, asset).map_or(0, |t| t.balance),
    }
}
