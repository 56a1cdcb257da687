use serde::Serialize;
use soroban_sdk::xdr::{AccountId, Asset};

use crate::asset::{asset_issuer, validate_asset};
use crate::balance::{load_account, load_trustline};
use crate::ledger::{LedgerEntry, LedgerTxn};

/// Result of a single payment attempt. Anything but `Success` leaves every
/// balance untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentOutcome {
    Success,
    InsufficientFunds,
    /// Destination trustline would exceed its limit.
    LineFull,
    /// Destination has no authorized trustline for the asset.
    NoTrust,
    /// Non-positive amount or invalid asset.
    Malformed,
    /// Native payment to an account that does not exist.
    NoDestination,
    /// Source has no authorized trustline for the asset.
    SourceNoTrust,
}

impl PaymentOutcome {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Moves funds between accounts inside a ledger transaction.
pub trait PaymentExecutor {
    fn pay(
        &self,
        ltx: &mut LedgerTxn<'_>,
        source: &AccountId,
        destination: &AccountId,
        asset: &Asset,
        amount: i64,
    ) -> PaymentOutcome;
}

impl<P: PaymentExecutor + ?Sized> PaymentExecutor for &P {
    fn pay(
        &self,
        ltx: &mut LedgerTxn<'_>,
        source: &AccountId,
        destination: &AccountId,
        asset: &Asset,
        amount: i64,
    ) -> PaymentOutcome {
        (**self).pay(ltx, source, destination, asset, amount)
    }
}

/// Executor that applies payments to account and trustline entries.
///
/// The issuer of a credit asset holds no trustline: paying from the issuer
/// mints and paying to it burns.
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerPaymentExecutor;

impl PaymentExecutor for LedgerPaymentExecutor {
    fn pay(
        &self,
        ltx: &mut LedgerTxn<'_>,
        source: &AccountId,
        destination: &AccountId,
        asset: &Asset,
        amount: i64,
    ) -> PaymentOutcome {
        let result =
            ltx.try_nested(|child| apply_payment(child, source, destination, asset, amount));
        let outcome = match result {
            Ok(()) => PaymentOutcome::Success,
            Err(outcome) => outcome,
        };
        tracing::debug!("Payment of {} finished with {:?}", amount, outcome);
        outcome
    }
}

fn apply_payment(
    ltx: &mut LedgerTxn<'_>,
    source: &AccountId,
    destination: &AccountId,
    asset: &Asset,
    amount: i64,
) -> Result<(), PaymentOutcome> {
    if amount <= 0 || validate_asset(asset).is_err() {
        return Err(PaymentOutcome::Malformed);
    }

    match asset_issuer(asset) {
        None => pay_native(ltx, source, destination, amount),
        Some(issuer) => pay_credit(ltx, source, destination, asset, issuer, amount),
    }
}

fn pay_native(
    ltx: &mut LedgerTxn<'_>,
    source: &AccountId,
    destination: &AccountId,
    amount: i64,
) -> Result<(), PaymentOutcome> {
    let mut from = load_account(ltx, source).ok_or(PaymentOutcome::InsufficientFunds)?;
    if from.balance < amount {
        return Err(PaymentOutcome::InsufficientFunds);
    }
    let mut to = load_account(ltx, destination).ok_or(PaymentOutcome::NoDestination)?;
    if source == destination {
        return Ok(());
    }

    from.balance -= amount;
    to.balance = to
        .balance
        .checked_add(amount)
        .ok_or(PaymentOutcome::LineFull)?;
    ltx.put(LedgerEntry::Account(from));
    ltx.put(LedgerEntry::Account(to));
    Ok(())
}

fn pay_credit(
    ltx: &mut LedgerTxn<'_>,
    source: &AccountId,
    destination: &AccountId,
    asset: &Asset,
    issuer: &AccountId,
    amount: i64,
) -> Result<(), PaymentOutcome> {
    if source != issuer {
        let mut line = load_trustline(ltx, source, asset)
            .filter(|t| t.authorized)
            .ok_or(PaymentOutcome::SourceNoTrust)?;
        if line.balance < amount {
            return Err(PaymentOutcome::InsufficientFunds);
        }
        if source == destination {
            return Ok(());
        }
        line.balance -= amount;
        ltx.put(LedgerEntry::Trustline(line));
    } else if source == destination {
        return Ok(());
    }

    if destination != issuer {
        let mut line = load_trustline(ltx, destination, asset)
            .filter(|t| t.authorized)
            .ok_or(PaymentOutcome::NoTrust)?;
        let credited = line
            .balance
            .checked_add(amount)
            .filter(|b| *b <= line.limit)
            .ok_or(PaymentOutcome::LineFull)?;
        line.balance = credited;
        ltx.put(LedgerEntry::Trustline(line));
    }
    Ok(())
}
