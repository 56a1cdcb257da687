//! Transactional ledger changeset.
//!
//! `LedgerStore` holds committed entries. Every mutation goes through a
//! `LedgerTxn`, an overlay of staged writes and tombstones layered on a parent
//! reader. A transaction is applied by turning it into a `LedgerDelta` and
//! committing that delta into its parent; dropping it discards every write.

use std::collections::BTreeMap;

use soroban_sdk::xdr::{AccountId, Asset};

use crate::allowance::{AllowanceKey, AllowanceRecord};

/// Entry kinds this core reads or writes, with their ledger discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum LedgerEntryType {
    Account = 0,
    Trustline = 1,
    Allowance = 8,
}

impl LedgerEntryType {
    pub fn discriminant(self) -> i32 {
        self as i32
    }
}

/// Native holdings of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountEntry {
    pub account_id: AccountId,
    pub balance: i64,
}

/// An account's opt-in balance record for an issued asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustLineEntry {
    pub account_id: AccountId,
    pub asset: Asset,
    pub balance: i64,
    pub limit: i64,
    pub authorized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerEntry {
    Account(AccountEntry),
    Trustline(TrustLineEntry),
    Allowance(AllowanceRecord),
}

impl LedgerEntry {
    pub fn entry_type(&self) -> LedgerEntryType {
        match self {
            Self::Account(_) => LedgerEntryType::Account,
            Self::Trustline(_) => LedgerEntryType::Trustline,
            Self::Allowance(_) => LedgerEntryType::Allowance,
        }
    }

    pub fn key(&self) -> LedgerKey {
        match self {
            Self::Account(a) => LedgerKey::Account(a.account_id.clone()),
            Self::Trustline(t) => LedgerKey::Trustline {
                account_id: t.account_id.clone(),
                asset: t.asset.clone(),
            },
            Self::Allowance(r) => LedgerKey::Allowance(r.key()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LedgerKey {
    Account(AccountId),
    Trustline { account_id: AccountId, asset: Asset },
    Allowance(AllowanceKey),
}

impl LedgerKey {
    pub fn entry_type(&self) -> LedgerEntryType {
        match self {
            Self::Account(_) => LedgerEntryType::Account,
            Self::Trustline { .. } => LedgerEntryType::Trustline,
            Self::Allowance(_) => LedgerEntryType::Allowance,
        }
    }
}

/// Read access to a layer of ledger state.
pub trait LedgerRead {
    fn load(&self, key: &LedgerKey) -> Option<LedgerEntry>;
}

/// Staged changes of a finished transaction. `None` marks a deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerDelta {
    changes: BTreeMap<LedgerKey, Option<LedgerEntry>>,
}

impl LedgerDelta {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Committed ledger state.
#[derive(Debug, Clone, Default)]
pub struct LedgerStore {
    entries: BTreeMap<LedgerKey, LedgerEntry>,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, entry_type: LedgerEntryType) -> usize {
        self.entries
            .keys()
            .filter(|k| k.entry_type() == entry_type)
            .count()
    }

    /// Open a top-level transaction over the committed state.
    pub fn begin(&self) -> LedgerTxn<'_> {
        LedgerTxn::new(self)
    }

    pub fn commit(&mut self, delta: LedgerDelta) {
        let count = delta.len();
        for (key, change) in delta.changes {
            match change {
                Some(entry) => {
                    self.entries.insert(key, entry);
                }
                None => {
                    self.entries.remove(&key);
                }
            }
        }
        tracing::info!("Committed {} ledger changes", count);
    }

    /// Run `f` in a fresh transaction and commit its writes only if it
    /// returns `Ok`.
    pub fn transact<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut LedgerTxn<'_>) -> Result<T, E>,
    {
        let (result, delta) = {
            let mut ltx = self.begin();
            let result = f(&mut ltx);
            (result, ltx.into_delta())
        };
        if result.is_ok() {
            self.commit(delta);
        }
        result
    }
}

impl LedgerRead for LedgerStore {
    fn load(&self, key: &LedgerKey) -> Option<LedgerEntry> {
        self.entries.get(key).cloned()
    }
}

/// A nestable overlay of staged writes.
pub struct LedgerTxn<'a> {
    parent: &'a dyn LedgerRead,
    changes: BTreeMap<LedgerKey, Option<LedgerEntry>>,
}

impl<'a> LedgerTxn<'a> {
    pub fn new(parent: &'a dyn LedgerRead) -> Self {
        Self {
            parent,
            changes: BTreeMap::new(),
        }
    }

    pub fn put(&mut self, entry: LedgerEntry) {
        self.changes.insert(entry.key(), Some(entry));
    }

    pub fn erase(&mut self, key: LedgerKey) {
        self.changes.insert(key, None);
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Open a child transaction reading through this one.
    pub fn nested(&self) -> LedgerTxn<'_> {
        LedgerTxn::new(self)
    }

    /// Fold a child's changes into this transaction; later writes win.
    pub fn absorb(&mut self, delta: LedgerDelta) {
        self.changes.extend(delta.changes);
    }

    pub fn into_delta(self) -> LedgerDelta {
        LedgerDelta {
            changes: self.changes,
        }
    }

    /// Run `f` in a child transaction, keeping its writes only on `Ok`.
    pub fn try_nested<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut LedgerTxn<'_>) -> Result<T, E>,
    {
        let (result, delta) = {
            let mut child = self.nested();
            let result = f(&mut child);
            (result, child.into_delta())
        };
        if result.is_ok() {
            self.absorb(delta);
        }
        result
    }
}

impl LedgerRead for LedgerTxn<'_> {
    fn load(&self, key: &LedgerKey) -> Option<LedgerEntry> {
        match self.changes.get(key) {
            Some(staged) => staged.clone(),
            None => self.parent.load(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::test_account;
    use std::sync::{Arc, Mutex};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    fn account(seed: u8, balance: i64) -> LedgerEntry {
        LedgerEntry::Account(AccountEntry {
            account_id: test_account(seed),
            balance,
        })
    }

    fn balance_in(ledger: &dyn LedgerRead, seed: u8) -> Option<i64> {
        match ledger.load(&LedgerKey::Account(test_account(seed))) {
            Some(LedgerEntry::Account(a)) => Some(a.balance),
            _ => None,
        }
    }

    #[test]
    fn test_dropped_txn_leaves_store_untouched() {
        let mut store = LedgerStore::new();
        store
            .transact(|ltx| {
                ltx.put(account(1, 100));
                Ok::<_, ()>(())
            })
            .unwrap();

        {
            let mut ltx = store.begin();
            ltx.put(account(1, 5));
            ltx.put(account(2, 7));
            assert_eq!(balance_in(&ltx, 1), Some(5));
        }

        assert_eq!(balance_in(&store, 1), Some(100));
        assert_eq!(balance_in(&store, 2), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_failed_transact_discards_writes() {
        let mut store = LedgerStore::new();
        let result: Result<(), &str> = store.transact(|ltx| {
            ltx.put(account(1, 100));
            Err("rejected")
        });
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_nested_commit_visible_after_absorb() {
        let mut store = LedgerStore::new();
        store
            .transact(|ltx| {
                ltx.put(account(1, 10));
                Ok::<_, ()>(())
            })
            .unwrap();

        let mut ltx = store.begin();
        let delta = {
            let mut child = ltx.nested();
            child.put(account(1, 20));
            assert_eq!(balance_in(&child, 1), Some(20));
            child.into_delta()
        };
        assert_eq!(balance_in(&ltx, 1), Some(10));
        ltx.absorb(delta);
        assert_eq!(balance_in(&ltx, 1), Some(20));
    }

    #[test]
    fn test_try_nested_discards_on_err() {
        let store = LedgerStore::new();
        let mut ltx = store.begin();
        let failed: Result<(), ()> = ltx.try_nested(|child| {
            child.put(account(4, 1));
            Err(())
        });
        assert!(failed.is_err());
        assert!(ltx.is_empty());

        let ok: Result<(), ()> = ltx.try_nested(|child| {
            child.put(account(4, 2));
            Ok(())
        });
        assert!(ok.is_ok());
        assert_eq!(balance_in(&ltx, 4), Some(2));
    }

    #[test]
    fn test_erase_hides_parent_entry() {
        let mut store = LedgerStore::new();
        store
            .transact(|ltx| {
                ltx.put(account(1, 10));
                Ok::<_, ()>(())
            })
            .unwrap();

        store
            .transact(|ltx| {
                ltx.erase(LedgerKey::Account(test_account(1)));
                assert_eq!(balance_in(ltx, 1), None);
                Ok::<_, ()>(())
            })
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let store = LedgerStore::new();
        let mut ltx = store.begin();
        ltx.put(account(1, 1));
        ltx.put(account(1, 2));
        ltx.put(account(1, 3));
        assert_eq!(balance_in(&ltx, 1), Some(3));
        assert_eq!(ltx.into_delta().len(), 1);
    }

    #[test]
    fn test_entry_type_discriminants() {
        assert_eq!(LedgerEntryType::Account.discriminant(), 0);
        assert_eq!(LedgerEntryType::Trustline.discriminant(), 1);
        assert_eq!(LedgerEntryType::Allowance.discriminant(), 8);
        assert_eq!(account(1, 0).entry_type(), LedgerEntryType::Account);
    }

    /// Layer recording the level of every event it sees.
    struct LevelRecorder(Arc<Mutex<Vec<Level>>>);

    impl<S: Subscriber> Layer<S> for LevelRecorder {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            self.0.lock().unwrap().push(*event.metadata().level());
        }
    }

    #[test]
    fn test_commit_logs_at_info() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(LevelRecorder(levels.clone()));
        let mut store = LedgerStore::new();

        tracing::subscriber::with_default(subscriber, || {
            store
                .transact(|ltx| {
                    ltx.put(account(1, 10));
                    Ok::<_, ()>(())
                })
                .unwrap();
        });

        assert_eq!(store.len(), 1);
        assert!(levels.lock().unwrap().contains(&Level::INFO));
    }
}
