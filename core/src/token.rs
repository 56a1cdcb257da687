use soroban_sdk::xdr::{AccountId, Asset};

use crate::allowance::{read_allowance, write_allowance};
use crate::asset::{asset_code, asset_to_string, validate_asset, DECIMALS, NATIVE_CODE};
use crate::balance::read_balance;
use crate::errors::AdaptorError;
use crate::ledger::LedgerTxn;
use crate::payment::{LedgerPaymentExecutor, PaymentExecutor, PaymentOutcome};

/// ERC-20 style surface of a ledger asset.
///
/// `caller` is the invoking identity supplied by the host. Caller-triggerable
/// failures (insufficient allowance or funds, missing trust) return `false`;
/// `Err` is reserved for invariant violations.
pub trait TokenInterface {
    fn name(&self) -> String;
    fn symbol(&self) -> String;
    fn decimals(&self) -> u32;
    fn balance_of(&self, ltx: &LedgerTxn<'_>, owner: &AccountId) -> i64;
    fn transfer(
        &self,
        ltx: &mut LedgerTxn<'_>,
        caller: &AccountId,
        to: &AccountId,
        value: i64,
    ) -> bool;
    fn transfer_from(
        &self,
        ltx: &mut LedgerTxn<'_>,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        value: i64,
    ) -> Result<bool, AdaptorError>;
    fn approve(
        &self,
        ltx: &mut LedgerTxn<'_>,
        caller: &AccountId,
        spender: &AccountId,
        value: i64,
    ) -> Result<bool, AdaptorError>;
    fn allowance(&self, ltx: &LedgerTxn<'_>, owner: &AccountId, spender: &AccountId) -> i64;
}

/// The storage-less contract exposing one asset through `TokenInterface`.
#[derive(Debug, Clone)]
pub struct AssetAdaptor<P = LedgerPaymentExecutor> {
    asset: Asset,
    executor: P,
}

enum Abort {
    Declined(PaymentOutcome),
    Fault(AdaptorError),
}

impl AssetAdaptor<LedgerPaymentExecutor> {
    pub fn native() -> Self {
        Self {
            asset: Asset::Native,
            executor: LedgerPaymentExecutor,
        }
    }
}

impl<P: PaymentExecutor> AssetAdaptor<P> {
    pub fn new(asset: Asset, executor: P) -> Result<Self, AdaptorError> {
        validate_asset(&asset)?;
        Ok(Self { asset, executor })
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }
}

impl<P: PaymentExecutor> TokenInterface for AssetAdaptor<P> {
    fn name(&self) -> String {
        match self.asset {
            Asset::Native => NATIVE_CODE.to_string(),
            _ => asset_to_string(&self.asset),
        }
    }

    fn symbol(&self) -> String {
        asset_code(&self.asset).unwrap_or_else(|| NATIVE_CODE.to_string())
    }

    fn decimals(&self) -> u32 {
        DECIMALS
    }

    fn balance_of(&self, ltx: &LedgerTxn<'_>, owner: &AccountId) -> i64 {
        read_balance(ltx, owner, &self.asset)
    }

    fn transfer(
        &self,
        ltx: &mut LedgerTxn<'_>,
        caller: &AccountId,
        to: &AccountId,
        value: i64,
    ) -> bool {
        if value <= 0 {
            tracing::debug!("Rejected transfer of non-positive amount {}", value);
            return false;
        }
        let outcome = self.executor.pay(ltx, caller, to, &self.asset, value);
        tracing::debug!("transfer of {} {}: {:?}", value, self.symbol(), outcome);
        outcome.is_success()
    }

    fn transfer_from(
        &self,
        ltx: &mut LedgerTxn<'_>,
        caller: &AccountId,
        from: &AccountId,
        to: &AccountId,
        value: i64,
    ) -> Result<bool, AdaptorError> {
        if value <= 0 {
            tracing::debug!("Rejected transfer_from of non-positive amount {}", value);
            return Ok(false);
        }

        let current = read_allowance(ltx, from, caller, &self.asset);
        let remaining = match current.checked_sub(value) {
            Some(remaining) if remaining >= 0 => remaining,
            _ => {
                tracing::debug!(
                    "transfer_from of {} {} exceeds allowance {}",
                    value,
                    self.symbol(),
                    current
                );
                return Ok(false);
            }
        };

        // Payment and decrement land together or not at all.
        let result = ltx.try_nested(|child| {
            let outcome = self.executor.pay(child, from, to, &self.asset, value);
            if !outcome.is_success() {
                return Err(Abort::Declined(outcome));
            }
            write_allowance(child, from, caller, &self.asset, remaining).map_err(Abort::Fault)
        });

        match result {
            Ok(()) => Ok(true),
            Err(Abort::Declined(outcome)) => {
                tracing::debug!("transfer_from of {} {}: {:?}", value, self.symbol(), outcome);
                Ok(false)
            }
            Err(Abort::Fault(err)) => Err(err),
        }
    }

    fn approve(
        &self,
        ltx: &mut LedgerTxn<'_>,
        caller: &AccountId,
        spender: &AccountId,
        value: i64,
    ) -> Result<bool, AdaptorError> {
        if value < 0 {
            tracing::warn!("Rejected approve of negative amount {}", value);
            return Ok(false);
        }
        write_allowance(ltx, caller, spender, &self.asset, value)?;
        Ok(true)
    }

    fn allowance(&self, ltx: &LedgerTxn<'_>, owner: &AccountId, spender: &AccountId) -> i64 {
        read_allowance(ltx, owner, spender, &self.asset)
    }
}
