//! Asset adaptors: ERC-20 style access to ledger assets.
//!
//! Every asset expressible as an `Asset` descriptor has an implicit adaptor,
//! addressed by `ContractIdentifier::AssetAdaptor`. Calls resolve through
//! [`identifier::resolve`], run against a [`ledger::LedgerTxn`] and read or
//! write allowance records, trustline and account balances.
//!
//! ## Modules
//!
//! - `identifier` - adaptor identity and dispatch targets
//! - `allowance` - allowance records keyed by (owner, spender, asset)
//! - `balance` - native and trustline balances
//! - `payment` - all-or-nothing payments
//! - `token` - the ERC-20 style operations
//! - `host` - entry point for calls addressed by identifier
//! - `ledger` - committed state and nestable transactions
//! - `codec` - XDR wire format

pub mod allowance;
pub mod api;
pub mod asset;
pub mod balance;
pub mod codec;
pub mod errors;
pub mod host;
pub mod identifier;
pub mod ledger;
pub mod payment;
pub mod settings;
pub mod token;

#[cfg(test)]
mod test;

pub use crate::allowance::{AllowanceKey, AllowanceRecord};
pub use crate::errors::{AdaptorError, AppError};
pub use crate::host::{AdaptorCall, CallResult, ContractRuntime, Host, NoContracts};
pub use crate::identifier::{adaptor_for, resolve, ContractIdentifier, ResolvedTarget};
pub use crate::ledger::{LedgerStore, LedgerTxn};
pub use crate::payment::{LedgerPaymentExecutor, PaymentExecutor, PaymentOutcome};
pub use crate::token::{AssetAdaptor, TokenInterface};
