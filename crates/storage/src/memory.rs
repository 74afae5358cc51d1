use crate::{LastSnapshot, StateStore, StoredTransaction};
use anyhow::Result;
use ledra_types::{
    Address, AssetId, AssetInfo, BalanceSnapshot, ContractInfo, LeaseId, OrderFill, OrderId,
    Portfolio, SlotId, TxId,
};
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct MemoryInner {
    transactions: HashMap<TxId, StoredTransaction>,
    order_fills: HashMap<OrderId, OrderFill>,
    portfolios: HashMap<Address, Portfolio>,
    assets: HashMap<AssetId, AssetInfo>,
    account_tx_ids: HashMap<(Address, u64), TxId>,
    account_tx_counts: HashMap<Address, u64>,
    balance_snapshots: HashMap<(Address, u64), BalanceSnapshot>,
    last_snapshots: HashMap<Address, LastSnapshot>,
    aliases: HashMap<String, Address>,
    contracts: HashMap<String, ContractInfo>,
    db_entries: HashMap<String, Vec<u8>>,
    lease_state: HashMap<LeaseId, bool>,
    slots: HashMap<SlotId, Vec<u8>>,
    height: u64,
}

/// In-memory backend for tests and benchmarks. Commit is a no-op; state
/// lives only as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get_transaction(&self, id: &TxId) -> Result<Option<StoredTransaction>> {
        Ok(self.inner.read().transactions.get(id).cloned())
    }

    fn put_transaction(&self, id: &TxId, record: &StoredTransaction) -> Result<()> {
        self.inner.write().transactions.insert(*id, record.clone());
        Ok(())
    }

    fn get_order_fill(&self, order: &OrderId) -> Result<Option<OrderFill>> {
        Ok(self.inner.read().order_fills.get(order).copied())
    }

    fn put_order_fill(&self, order: &OrderId, fill: &OrderFill) -> Result<()> {
        self.inner.write().order_fills.insert(*order, *fill);
        Ok(())
    }

    fn get_portfolio(&self, account: &Address) -> Result<Option<Portfolio>> {
        Ok(self.inner.read().portfolios.get(account).cloned())
    }

    fn put_portfolio(&self, account: &Address, portfolio: &Portfolio) -> Result<()> {
        self.inner
            .write()
            .portfolios
            .insert(*account, portfolio.clone());
        Ok(())
    }

    fn get_asset_info(&self, asset: &AssetId) -> Result<Option<AssetInfo>> {
        Ok(self.inner.read().assets.get(asset).copied())
    }

    fn put_asset_info(&self, asset: &AssetId, info: &AssetInfo) -> Result<()> {
        self.inner.write().assets.insert(*asset, *info);
        Ok(())
    }

    fn account_tx_count(&self, account: &Address) -> Result<u64> {
        Ok(self
            .inner
            .read()
            .account_tx_counts
            .get(account)
            .copied()
            .unwrap_or(0))
    }

    fn set_account_tx_count(&self, account: &Address, count: u64) -> Result<()> {
        self.inner.write().account_tx_counts.insert(*account, count);
        Ok(())
    }

    fn get_account_tx_id(&self, account: &Address, index: u64) -> Result<Option<TxId>> {
        Ok(self
            .inner
            .read()
            .account_tx_ids
            .get(&(*account, index))
            .copied())
    }

    fn put_account_tx_id(&self, account: &Address, index: u64, tx: &TxId) -> Result<()> {
        self.inner
            .write()
            .account_tx_ids
            .insert((*account, index), *tx);
        Ok(())
    }

    fn get_balance_snapshot(
        &self,
        account: &Address,
        height: u64,
    ) -> Result<Option<BalanceSnapshot>> {
        Ok(self
            .inner
            .read()
            .balance_snapshots
            .get(&(*account, height))
            .copied())
    }

    fn put_balance_snapshot(
        &self,
        account: &Address,
        height: u64,
        snapshot: &BalanceSnapshot,
    ) -> Result<()> {
        self.inner
            .write()
            .balance_snapshots
            .insert((*account, height), *snapshot);
        Ok(())
    }

    fn last_snapshot(&self, account: &Address) -> Result<Option<LastSnapshot>> {
        Ok(self.inner.read().last_snapshots.get(account).copied())
    }

    fn set_last_snapshot(&self, account: &Address, last: &LastSnapshot) -> Result<()> {
        self.inner.write().last_snapshots.insert(*account, *last);
        Ok(())
    }

    fn get_alias(&self, alias: &str) -> Result<Option<Address>> {
        Ok(self.inner.read().aliases.get(alias).copied())
    }

    fn put_alias(&self, alias: &str, account: &Address) -> Result<()> {
        self.inner
            .write()
            .aliases
            .insert(alias.to_string(), *account);
        Ok(())
    }

    fn get_contract(&self, name: &str) -> Result<Option<ContractInfo>> {
        Ok(self.inner.read().contracts.get(name).cloned())
    }

    fn put_contract(&self, name: &str, contract: &ContractInfo) -> Result<()> {
        self.inner
            .write()
            .contracts
            .insert(name.to_string(), contract.clone());
        Ok(())
    }

    fn get_db_entry(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.read().db_entries.get(key).cloned())
    }

    fn put_db_entry(&self, key: &str, value: &[u8]) -> Result<()> {
        self.inner
            .write()
            .db_entries
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn get_lease_state(&self, lease: &LeaseId) -> Result<Option<bool>> {
        Ok(self.inner.read().lease_state.get(lease).copied())
    }

    fn put_lease_state(&self, lease: &LeaseId, active: bool) -> Result<()> {
        self.inner.write().lease_state.insert(*lease, active);
        Ok(())
    }

    fn get_slot(&self, slot: SlotId) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.read().slots.get(&slot).cloned())
    }

    fn put_slot(&self, slot: SlotId, account: &[u8]) -> Result<()> {
        self.inner.write().slots.insert(slot, account.to_vec());
        Ok(())
    }

    fn release_slot(&self, slot: SlotId) -> Result<()> {
        self.inner.write().slots.remove(&slot);
        Ok(())
    }

    fn height(&self) -> Result<u64> {
        Ok(self.inner.read().height)
    }

    fn set_height(&self, height: u64) -> Result<()> {
        self.inner.write().height = height;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.write() = MemoryInner::default();
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        Ok(())
    }
}
