use soroban_sdk::xdr::AccountId;

use crate::errors::AdaptorError;
use crate::identifier::{resolve, ContractIdentifier, ResolvedTarget};
use crate::ledger::LedgerTxn;
use crate::payment::{LedgerPaymentExecutor, PaymentExecutor};
use crate::token::{AssetAdaptor, TokenInterface};

/// One invocation of the token interface. The asset comes from the
/// identifier the call is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdaptorCall {
    Name,
    Symbol,
    Decimals,
    BalanceOf { owner: AccountId },
    Transfer { to: AccountId, value: i64 },
    TransferFrom { from: AccountId, to: AccountId, value: i64 },
    Approve { spender: AccountId, value: i64 },
    Allowance { owner: AccountId, spender: AccountId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallResult {
    Text(String),
    U32(u32),
    Amount(i64),
    Bool(bool),
}

/// Executes calls addressed to general-purpose contracts.
pub trait ContractRuntime {
    fn invoke(
        &self,
        ltx: &mut LedgerTxn<'_>,
        handle: i64,
        caller: &AccountId,
        call: &AdaptorCall,
    ) -> Result<CallResult, AdaptorError>;
}

/// Runtime for hosts that only serve asset adaptors.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContracts;

impl ContractRuntime for NoContracts {
    fn invoke(
        &self,
        _ltx: &mut LedgerTxn<'_>,
        handle: i64,
        _caller: &AccountId,
        _call: &AdaptorCall,
    ) -> Result<CallResult, AdaptorError> {
        Err(AdaptorError::UnknownContract(handle))
    }
}

/// Entry point for calls addressed by `ContractIdentifier`.
#[derive(Debug, Clone, Default)]
pub struct Host<P = LedgerPaymentExecutor, C = NoContracts> {
    executor: P,
    contracts: C,
}

impl<P: PaymentExecutor, C: ContractRuntime> Host<P, C> {
    pub fn new(executor: P, contracts: C) -> Self {
        Self {
            executor,
            contracts,
        }
    }

    /// Resolve `target` and run `call` as `caller`.
    ///
    /// The call runs in a nested transaction; on `Err` none of its writes
    /// reach `ltx`.
    pub fn invoke(
        &self,
        ltx: &mut LedgerTxn<'_>,
        target: &ContractIdentifier,
        caller: &AccountId,
        call: &AdaptorCall,
    ) -> Result<CallResult, AdaptorError> {
        let resolved = resolve(target)?;
        ltx.try_nested(|child| match resolved {
            ResolvedTarget::Contract(handle) => self.contracts.invoke(child, handle, caller, call),
            ResolvedTarget::AssetAdaptor(asset) => {
                let adaptor = AssetAdaptor::new(asset, &self.executor)?;
                dispatch(&adaptor, child, caller, call)
            }
        })
    }
}

fn dispatch<T: TokenInterface>(
    token: &T,
    ltx: &mut LedgerTxn<'_>,
    caller: &AccountId,
    call: &AdaptorCall,
) -> Result<CallResult, AdaptorError> {
    tracing::debug!("Dispatching {:?} on {}", call, token.name());
    let result = match call {
        AdaptorCall::Name => CallResult::Text(token.name()),
        AdaptorCall::Symbol => CallResult::Text(token.symbol()),
        AdaptorCall::Decimals => CallResult::U32(token.decimals()),
        AdaptorCall::BalanceOf { owner } => CallResult::Amount(token.balance_of(ltx, owner)),
        AdaptorCall::Transfer { to, value } => {
            CallResult::Bool(token.transfer(ltx, caller, to, *value))
        }
        AdaptorCall::TransferFrom { from, to, value } => {
            CallResult::Bool(token.transfer_from(ltx, caller, from, to, *value)?)
        }
        AdaptorCall::Approve { spender, value } => {
            CallResult::Bool(token.approve(ltx, caller, spender, *value)?)
        }
        AdaptorCall::Allowance { owner, spender } => {
            CallResult::Amount(token.allowance(ltx, owner, spender))
        }
    };
    Ok(result)
}
