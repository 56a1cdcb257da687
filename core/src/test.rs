#![cfg(test)]

use crate::asset::{credit_asset, test_account};
use crate::errors::AdaptorError;
use crate::host::{AdaptorCall, CallResult, Host};
use crate::identifier::adaptor_for;
use crate::ledger::{AccountEntry, LedgerEntry, LedgerEntryType, LedgerStore, TrustLineEntry};
use crate::payment::LedgerPaymentExecutor;
use crate::token::{AssetAdaptor, TokenInterface};
use soroban_sdk::xdr::{AccountId, Asset};

fn open_trustline(store: &mut LedgerStore, holder: &AccountId, asset: &Asset, balance: i64) {
    store
        .transact(|ltx| {
            ltx.put(LedgerEntry::Account(AccountEntry {
                account_id: holder.clone(),
                balance: 0,
            }));
            ltx.put(LedgerEntry::Trustline(TrustLineEntry {
                account_id: holder.clone(),
                asset: asset.clone(),
                balance,
                limit: 1_000_000,
                authorized: true,
            }));
            Ok::<_, AdaptorError>(())
        })
        .unwrap();
}

#[test]
fn test_approve_then_transfer_from() {
    let mut store = LedgerStore::new();
    let issuer = test_account(9);
    let usd = credit_asset("USD", issuer).unwrap();
    let (owner, spender, dest) = (test_account(1), test_account(2), test_account(3));
    open_trustline(&mut store, &owner, &usd, 500);
    open_trustline(&mut store, &dest, &usd, 0);

    let token = AssetAdaptor::new(usd.clone(), LedgerPaymentExecutor).unwrap();

    store
        .transact(|ltx| token.approve(ltx, &owner, &spender, 100))
        .unwrap();

    let moved = store
        .transact(|ltx| token.transfer_from(ltx, &spender, &owner, &dest, 30))
        .unwrap();
    assert!(moved);

    let ltx = store.begin();
    assert_eq!(token.allowance(&ltx, &owner, &spender), 70);
    assert_eq!(token.balance_of(&ltx, &dest), 30);
    assert_eq!(token.balance_of(&ltx, &owner), 470);
    drop(ltx);

    let moved = store
        .transact(|ltx| token.transfer_from(ltx, &spender, &owner, &dest, 80))
        .unwrap();
    assert!(!moved);

    let ltx = store.begin();
    assert_eq!(token.allowance(&ltx, &owner, &spender), 70);
    assert_eq!(token.balance_of(&ltx, &dest), 30);
}

#[test]
fn test_failed_payment_keeps_allowance() {
    let mut store = LedgerStore::new();
    let usd = credit_asset("USD", test_account(9)).unwrap();
    let (owner, spender, stranger) = (test_account(1), test_account(2), test_account(4));
    open_trustline(&mut store, &owner, &usd, 500);

    let token = AssetAdaptor::new(usd, LedgerPaymentExecutor).unwrap();
    store
        .transact(|ltx| token.approve(ltx, &owner, &spender, 100))
        .unwrap();

    // Destination holds no trustline.
    let moved = store
        .transact(|ltx| token.transfer_from(ltx, &spender, &owner, &stranger, 50))
        .unwrap();
    assert!(!moved);

    let ltx = store.begin();
    assert_eq!(token.allowance(&ltx, &owner, &spender), 100);
    assert_eq!(token.balance_of(&ltx, &owner), 500);
}

#[test]
fn test_spending_allowance_to_zero_removes_record() {
    let mut store = LedgerStore::new();
    let usd = credit_asset("USD", test_account(9)).unwrap();
    let (owner, spender) = (test_account(1), test_account(2));
    open_trustline(&mut store, &owner, &usd, 500);
    open_trustline(&mut store, &spender, &usd, 0);

    let token = AssetAdaptor::new(usd, LedgerPaymentExecutor).unwrap();
    store
        .transact(|ltx| token.approve(ltx, &owner, &spender, 40))
        .unwrap();
    assert_eq!(store.count(LedgerEntryType::Allowance), 1);

    assert!(store
        .transact(|ltx| token.transfer_from(ltx, &spender, &owner, &spender, 40))
        .unwrap());
    assert_eq!(store.count(LedgerEntryType::Allowance), 0);
}

#[test]
fn test_speculative_batch_is_discarded() {
    let mut store = LedgerStore::new();
    let (owner, spender, dest) = (test_account(1), test_account(2), test_account(3));
    store
        .transact(|ltx| {
            for (id, balance) in [(&owner, 1_000), (&dest, 0)] {
                ltx.put(LedgerEntry::Account(AccountEntry {
                    account_id: id.clone(),
                    balance,
                }));
            }
            Ok::<_, AdaptorError>(())
        })
        .unwrap();

    let host: Host = Host::default();
    let xlm = adaptor_for(&Asset::Native);
    {
        let mut ltx = store.begin();
        let batch = [
            (
                &owner,
                AdaptorCall::Approve {
                    spender: spender.clone(),
                    value: 500,
                },
            ),
            (
                &spender,
                AdaptorCall::TransferFrom {
                    from: owner.clone(),
                    to: dest.clone(),
                    value: 200,
                },
            ),
        ];
        for (caller, call) in &batch {
            let result = host.invoke(&mut ltx, &xlm, caller, call).unwrap();
            assert_eq!(result, CallResult::Bool(true));
        }
        let balance = AdaptorCall::BalanceOf {
            owner: dest.clone(),
        };
        assert_eq!(
            host.invoke(&mut ltx, &xlm, &dest, &balance).unwrap(),
            CallResult::Amount(200)
        );
        // Rejected: ltx dropped without commit.
    }

    let ltx = store.begin();
    let token = AssetAdaptor::native();
    assert_eq!(token.balance_of(&ltx, &owner), 1_000);
    assert_eq!(token.balance_of(&ltx, &dest), 0);
    assert_eq!(token.allowance(&ltx, &owner, &spender), 0);
}

#[test]
fn test_writes_within_one_transaction_apply_in_order() {
    let mut store = LedgerStore::new();
    let (owner, spender) = (test_account(1), test_account(2));
    let token = AssetAdaptor::native();

    store
        .transact(|ltx| {
            token.approve(ltx, &owner, &spender, 10)?;
            assert_eq!(token.allowance(ltx, &owner, &spender), 10);
            token.approve(ltx, &owner, &spender, 3)?;
            token.approve(ltx, &owner, &spender, 7)
        })
        .unwrap();

    let ltx = store.begin();
    assert_eq!(token.allowance(&ltx, &owner, &spender), 7);
}
