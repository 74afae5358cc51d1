//! Durable ledger state and the block-diff merge engine.
//!
//! The [`StateStore`] trait is the sole durable substrate: one logical table
//! per state kind with typed get/put accessors, a height register, a
//! whole-store [`clear`](StateStore::clear) and an explicit
//! [`commit`](StateStore::commit). [`SledStore`] persists the tables as sled
//! trees; [`MemoryStore`] backs tests and benchmarks. [`StateWriter`] owns a
//! store behind a readers-writer lock and folds [`BlockDiff`]s into it.
//!
//! The table set is closed: adding a new state kind means extending both the
//! diff shape and the merge loop.

use anyhow::Result;
use ledra_types::{
    Address, AssetId, AssetInfo, BalanceSnapshot, ContractInfo, LeaseId, OrderFill, OrderId,
    Portfolio, SlotId, TxId,
};
use serde::{Deserialize, Serialize};

pub mod keys;
mod memory;
mod sled_store;
mod writer;

pub use memory::MemoryStore;
pub use sled_store::SledStore;
pub use writer::StateWriter;

/// Storage errors
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("malformed stored record in table {table}")]
    MalformedRecord { table: &'static str },
}

/// Persisted form of a transaction table entry: inclusion height plus the
/// binary-encoded transaction bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTransaction {
    pub height: u64,
    pub bytes: Vec<u8>,
}

/// Per-account fast-path cache: the height of the most recent balance
/// snapshot and its weighted balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastSnapshot {
    pub height: u64,
    pub weighted_balance: i64,
}

/// Abstract durable substrate for ledger state.
///
/// Implementations must be usable behind a shared reference; writes become
/// durable only at [`commit`](StateStore::commit).
pub trait StateStore {
    fn get_transaction(&self, id: &TxId) -> Result<Option<StoredTransaction>>;
    fn put_transaction(&self, id: &TxId, record: &StoredTransaction) -> Result<()>;

    fn get_order_fill(&self, order: &OrderId) -> Result<Option<OrderFill>>;
    fn put_order_fill(&self, order: &OrderId, fill: &OrderFill) -> Result<()>;

    fn get_portfolio(&self, account: &Address) -> Result<Option<Portfolio>>;
    fn put_portfolio(&self, account: &Address, portfolio: &Portfolio) -> Result<()>;

    fn get_asset_info(&self, asset: &AssetId) -> Result<Option<AssetInfo>>;
    fn put_asset_info(&self, asset: &AssetId, info: &AssetInfo) -> Result<()>;

    /// Number of transaction ids recorded for the account (0 if none).
    fn account_tx_count(&self, account: &Address) -> Result<u64>;
    fn set_account_tx_count(&self, account: &Address, count: u64) -> Result<()>;
    fn get_account_tx_id(&self, account: &Address, index: u64) -> Result<Option<TxId>>;
    fn put_account_tx_id(&self, account: &Address, index: u64, tx: &TxId) -> Result<()>;

    fn get_balance_snapshot(
        &self,
        account: &Address,
        height: u64,
    ) -> Result<Option<BalanceSnapshot>>;
    fn put_balance_snapshot(
        &self,
        account: &Address,
        height: u64,
        snapshot: &BalanceSnapshot,
    ) -> Result<()>;
    fn last_snapshot(&self, account: &Address) -> Result<Option<LastSnapshot>>;
    fn set_last_snapshot(&self, account: &Address, last: &LastSnapshot) -> Result<()>;

    fn get_alias(&self, alias: &str) -> Result<Option<Address>>;
    fn put_alias(&self, alias: &str, account: &Address) -> Result<()>;

    fn get_contract(&self, name: &str) -> Result<Option<ContractInfo>>;
    fn put_contract(&self, name: &str, contract: &ContractInfo) -> Result<()>;

    fn get_db_entry(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put_db_entry(&self, key: &str, value: &[u8]) -> Result<()>;

    fn get_lease_state(&self, lease: &LeaseId) -> Result<Option<bool>>;
    fn put_lease_state(&self, lease: &LeaseId, active: bool) -> Result<()>;

    fn get_slot(&self, slot: SlotId) -> Result<Option<Vec<u8>>>;
    fn put_slot(&self, slot: SlotId, account: &[u8]) -> Result<()>;
    fn release_slot(&self, slot: SlotId) -> Result<()>;

    fn height(&self) -> Result<u64>;
    fn set_height(&self, height: u64) -> Result<()>;

    /// Reset every table to empty and the height to 0.
    fn clear(&self) -> Result<()>;
    /// Make every write since the previous commit durable.
    fn commit(&self) -> Result<()>;
}
