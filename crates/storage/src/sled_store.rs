use crate::keys::account_index_key;
use crate::{LastSnapshot, StateStore, StorageError, StoredTransaction};
use anyhow::Result;
use ledra_types::{
    Address, AssetId, AssetInfo, BalanceSnapshot, ContractInfo, LeaseId, OrderFill, OrderId,
    Portfolio, SlotId, TxId, ADDRESS_BYTES,
};
use sled::{Db, Tree};
use std::path::Path;

const TRANSACTIONS: &str = "transactions";
const ORDER_FILLS: &str = "order_fills";
const PORTFOLIOS: &str = "portfolios";
const ASSETS: &str = "assets";
const ACCOUNT_TX_IDS: &str = "account_tx_ids";
const ACCOUNT_TX_COUNTS: &str = "account_tx_counts";
const BALANCE_SNAPSHOTS: &str = "balance_snapshots";
const LAST_SNAPSHOTS: &str = "last_snapshots";
const ALIASES: &str = "aliases";
const CONTRACTS: &str = "contracts";
const DB_ENTRIES: &str = "db_entries";
const LEASE_STATE: &str = "lease_state";
const SLOTS: &str = "slots";
const METADATA: &str = "metadata";

const HEIGHT_KEY: &[u8] = b"height";

/// Sled-backed implementation: one tree per table, values stored as JSON
/// except for the binary transaction records and raw byte tables. Writes
/// become durable at [`commit`](StateStore::commit), which flushes the
/// database.
pub struct SledStore {
    db: Db,
    transactions: Tree,
    order_fills: Tree,
    portfolios: Tree,
    assets: Tree,
    account_tx_ids: Tree,
    account_tx_counts: Tree,
    balance_snapshots: Tree,
    last_snapshots: Tree,
    aliases: Tree,
    contracts: Tree,
    db_entries: Tree,
    lease_state: Tree,
    slots: Tree,
    metadata: Tree,
}

impl SledStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        let transactions = db.open_tree(TRANSACTIONS)?;
        let order_fills = db.open_tree(ORDER_FILLS)?;
        let portfolios = db.open_tree(PORTFOLIOS)?;
        let assets = db.open_tree(ASSETS)?;
        let account_tx_ids = db.open_tree(ACCOUNT_TX_IDS)?;
        let account_tx_counts = db.open_tree(ACCOUNT_TX_COUNTS)?;
        let balance_snapshots = db.open_tree(BALANCE_SNAPSHOTS)?;
        let last_snapshots = db.open_tree(LAST_SNAPSHOTS)?;
        let aliases = db.open_tree(ALIASES)?;
        let contracts = db.open_tree(CONTRACTS)?;
        let db_entries = db.open_tree(DB_ENTRIES)?;
        let lease_state = db.open_tree(LEASE_STATE)?;
        let slots = db.open_tree(SLOTS)?;
        let metadata = db.open_tree(METADATA)?;

        Ok(Self {
            db,
            transactions,
            order_fills,
            portfolios,
            assets,
            account_tx_ids,
            account_tx_counts,
            balance_snapshots,
            last_snapshots,
            aliases,
            contracts,
            db_entries,
            lease_state,
            slots,
            metadata,
        })
    }
}

impl StateStore for SledStore {
    fn get_transaction(&self, id: &TxId) -> Result<Option<StoredTransaction>> {
        match self.transactions.get(&id[..])? {
            Some(value) => {
                if value.len() < 8 {
                    return Err(StorageError::MalformedRecord {
                        table: TRANSACTIONS,
                    }
                    .into());
                }
                let height = u64::from_be_bytes(value[..8].try_into().unwrap());
                Ok(Some(StoredTransaction {
                    height,
                    bytes: value[8..].to_vec(),
                }))
            }
            None => Ok(None),
        }
    }

    fn put_transaction(&self, id: &TxId, record: &StoredTransaction) -> Result<()> {
        let mut value = Vec::with_capacity(8 + record.bytes.len());
        value.extend_from_slice(&record.height.to_be_bytes());
        value.extend_from_slice(&record.bytes);
        self.transactions.insert(&id[..], value)?;
        Ok(())
    }

    fn get_order_fill(&self, order: &OrderId) -> Result<Option<OrderFill>> {
        self.order_fills
            .get(&order[..])?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn put_order_fill(&self, order: &OrderId, fill: &OrderFill) -> Result<()> {
        self.order_fills
            .insert(&order[..], serde_json::to_vec(fill)?)?;
        Ok(())
    }

    fn get_portfolio(&self, account: &Address) -> Result<Option<Portfolio>> {
        self.portfolios
            .get(&account.0[..])?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn put_portfolio(&self, account: &Address, portfolio: &Portfolio) -> Result<()> {
        self.portfolios
            .insert(&account.0[..], serde_json::to_vec(portfolio)?)?;
        Ok(())
    }

    fn get_asset_info(&self, asset: &AssetId) -> Result<Option<AssetInfo>> {
        self.assets
            .get(&asset.0[..])?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn put_asset_info(&self, asset: &AssetId, info: &AssetInfo) -> Result<()> {
        self.assets
            .insert(&asset.0[..], serde_json::to_vec(info)?)?;
        Ok(())
    }

    fn account_tx_count(&self, account: &Address) -> Result<u64> {
        match self.account_tx_counts.get(&account.0[..])? {
            Some(value) => {
                let count =
                    u64::from_be_bytes(value.as_ref().try_into().map_err(|_| {
                        StorageError::MalformedRecord {
                            table: ACCOUNT_TX_COUNTS,
                        }
                    })?);
                Ok(count)
            }
            None => Ok(0),
        }
    }

    fn set_account_tx_count(&self, account: &Address, count: u64) -> Result<()> {
        self.account_tx_counts
            .insert(&account.0[..], &count.to_be_bytes())?;
        Ok(())
    }

    fn get_account_tx_id(&self, account: &Address, index: u64) -> Result<Option<TxId>> {
        match self.account_tx_ids.get(account_index_key(account, index))? {
            Some(value) => {
                let id: TxId =
                    value
                        .as_ref()
                        .try_into()
                        .map_err(|_| StorageError::MalformedRecord {
                            table: ACCOUNT_TX_IDS,
                        })?;
                Ok(Some(id))
            }
            None => Ok(None),
        }
    }

    fn put_account_tx_id(&self, account: &Address, index: u64, tx: &TxId) -> Result<()> {
        self.account_tx_ids
            .insert(account_index_key(account, index), &tx[..])?;
        Ok(())
    }

    fn get_balance_snapshot(
        &self,
        account: &Address,
        height: u64,
    ) -> Result<Option<BalanceSnapshot>> {
        self.balance_snapshots
            .get(account_index_key(account, height))?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn put_balance_snapshot(
        &self,
        account: &Address,
        height: u64,
        snapshot: &BalanceSnapshot,
    ) -> Result<()> {
        self.balance_snapshots.insert(
            account_index_key(account, height),
            serde_json::to_vec(snapshot)?,
        )?;
        Ok(())
    }

    fn last_snapshot(&self, account: &Address) -> Result<Option<LastSnapshot>> {
        self.last_snapshots
            .get(&account.0[..])?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn set_last_snapshot(&self, account: &Address, last: &LastSnapshot) -> Result<()> {
        self.last_snapshots
            .insert(&account.0[..], serde_json::to_vec(last)?)?;
        Ok(())
    }

    fn get_alias(&self, alias: &str) -> Result<Option<Address>> {
        match self.aliases.get(alias.as_bytes())? {
            Some(value) => {
                let bytes: [u8; ADDRESS_BYTES] =
                    value
                        .as_ref()
                        .try_into()
                        .map_err(|_| StorageError::MalformedRecord { table: ALIASES })?;
                Ok(Some(Address(bytes)))
            }
            None => Ok(None),
        }
    }

    fn put_alias(&self, alias: &str, account: &Address) -> Result<()> {
        self.aliases.insert(alias.as_bytes(), &account.0[..])?;
        Ok(())
    }

    fn get_contract(&self, name: &str) -> Result<Option<ContractInfo>> {
        self.contracts
            .get(name.as_bytes())?
            .map(|v| serde_json::from_slice(&v))
            .transpose()
            .map_err(Into::into)
    }

    fn put_contract(&self, name: &str, contract: &ContractInfo) -> Result<()> {
        self.contracts
            .insert(name.as_bytes(), serde_json::to_vec(contract)?)?;
        Ok(())
    }

    fn get_db_entry(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db_entries.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn put_db_entry(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db_entries.insert(key.as_bytes(), value)?;
        Ok(())
    }

    fn get_lease_state(&self, lease: &LeaseId) -> Result<Option<bool>> {
        match self.lease_state.get(&lease[..])? {
            Some(value) => match value.first() {
                Some(byte) => Ok(Some(*byte != 0)),
                None => Err(StorageError::MalformedRecord { table: LEASE_STATE }.into()),
            },
            None => Ok(None),
        }
    }

    fn put_lease_state(&self, lease: &LeaseId, active: bool) -> Result<()> {
        self.lease_state.insert(&lease[..], &[active as u8][..])?;
        Ok(())
    }

    fn get_slot(&self, slot: SlotId) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(slot.to_be_bytes())?.map(|v| v.to_vec()))
    }

    fn put_slot(&self, slot: SlotId, account: &[u8]) -> Result<()> {
        self.slots.insert(slot.to_be_bytes(), account)?;
        Ok(())
    }

    fn release_slot(&self, slot: SlotId) -> Result<()> {
        self.slots.remove(slot.to_be_bytes())?;
        Ok(())
    }

    fn height(&self) -> Result<u64> {
        match self.metadata.get(HEIGHT_KEY)? {
            Some(value) => {
                let height =
                    u64::from_be_bytes(value.as_ref().try_into().map_err(|_| {
                        StorageError::MalformedRecord { table: METADATA }
                    })?);
                Ok(height)
            }
            None => Ok(0),
        }
    }

    fn set_height(&self, height: u64) -> Result<()> {
        self.metadata.insert(HEIGHT_KEY, &height.to_be_bytes())?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.transactions.clear()?;
        self.order_fills.clear()?;
        self.portfolios.clear()?;
        self.assets.clear()?;
        self.account_tx_ids.clear()?;
        self.account_tx_counts.clear()?;
        self.balance_snapshots.clear()?;
        self.last_snapshots.clear()?;
        self.aliases.clear()?;
        self.contracts.clear()?;
        self.db_entries.clear()?;
        self.lease_state.clear()?;
        self.slots.clear()?;
        self.metadata.clear()?;
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }
}
