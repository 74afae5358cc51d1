use crate::{LastSnapshot, StateStore, StoredTransaction};
use anyhow::Result;
use ledra_types::{AssetInfo, BlockDiff, OrderFill, Portfolio, TxId};
use parking_lot::{RwLock, RwLockReadGuard};
use rayon::prelude::*;
use tracing::{debug, info};

/// The block-diff merge engine.
///
/// Owns the backing store behind a readers-writer lock: any number of
/// readers may query concurrently through [`read`](StateWriter::read), while
/// [`apply_block_diff`](StateWriter::apply_block_diff) and
/// [`clear`](StateWriter::clear) take exclusive access. The engine holds no
/// state across calls besides the store handle; reuse it for sequential
/// merges, never for concurrent overlapping ones.
pub struct StateWriter<S> {
    store: RwLock<S>,
}

impl<S: StateStore> StateWriter<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: RwLock::new(store),
        }
    }

    /// Shared read access to the underlying store for state queries.
    /// Blocks while a merge is in progress.
    pub fn read(&self) -> RwLockReadGuard<'_, S> {
        self.store.read()
    }

    /// Consume the writer and return the underlying store.
    pub fn into_inner(self) -> S {
        self.store.into_inner()
    }

    /// Merge one block diff into durable state and commit.
    ///
    /// Sub-maps are applied in a fixed order; no step reads a table written
    /// by a later step. Accumulating kinds fold onto the stored value with
    /// the stored value as accumulator, overwriting kinds take the diff's
    /// value verbatim, and the transaction index is append-only. Any storage
    /// error aborts the merge before commit, leaving the backend's last
    /// committed state as the durable truth; no retries are attempted here.
    pub fn apply_block_diff(&self, diff: BlockDiff) -> Result<()> {
        let store = self.store.write();
        let txs = &diff.txs_diff;
        debug!(
            height_diff = diff.height_diff,
            transactions = txs.transactions.len(),
            portfolios = txs.portfolios.len(),
            "applying block diff"
        );

        // Encoding dominates the per-transaction cost and is independent per
        // entry, so it fans out; every write lands before the next step runs.
        let encoded: Vec<(TxId, StoredTransaction)> = txs
            .transactions
            .par_iter()
            .map(|(id, (height, tx))| {
                (
                    *id,
                    StoredTransaction {
                        height: *height,
                        bytes: tx.to_bytes(),
                    },
                )
            })
            .collect();
        for (id, record) in &encoded {
            store.put_transaction(id, record)?;
        }

        for (order, delta) in &txs.order_fills {
            let existing = store.get_order_fill(order)?.unwrap_or_else(OrderFill::identity);
            store.put_order_fill(order, &existing.combine(delta))?;
        }

        for (account, delta) in &txs.portfolios {
            let existing = store
                .get_portfolio(account)?
                .unwrap_or_else(Portfolio::identity);
            store.put_portfolio(account, &existing.combine(delta))?;
        }

        for (asset, delta) in &txs.issued_assets {
            let existing = store
                .get_asset_info(asset)?
                .unwrap_or_else(AssetInfo::identity);
            store.put_asset_info(asset, &existing.combine(delta))?;
        }

        for (account, tx_ids) in &txs.account_transaction_ids {
            let base = store.account_tx_count(account)?;
            // Diff ids arrive most recent first; replay in reverse so the
            // stored index stays chronological.
            for (offset, tx_id) in tx_ids.iter().rev().enumerate() {
                store.put_account_tx_id(account, base + offset as u64, tx_id)?;
            }
            store.set_account_tx_count(account, base + tx_ids.len() as u64)?;
        }

        for (account, by_height) in &diff.snapshots {
            for (height, snapshot) in by_height {
                store.put_balance_snapshot(account, *height, snapshot)?;
            }
            if let Some((height, snapshot)) = by_height.iter().next_back() {
                store.set_last_snapshot(
                    account,
                    &LastSnapshot {
                        height: *height,
                        weighted_balance: snapshot.weighted_balance,
                    },
                )?;
            }
        }

        for (alias, account) in &txs.aliases {
            store.put_alias(alias, account)?;
        }

        for (name, contract) in &txs.contracts {
            store.put_contract(name, contract)?;
        }

        for (key, value) in &txs.db_entries {
            store.put_db_entry(key, value)?;
        }

        for (lease, active) in &txs.lease_state {
            store.put_lease_state(lease, *active)?;
        }

        for (slot, account) in &txs.slot_ids {
            if account.is_empty() {
                store.release_slot(*slot)?;
            } else {
                store.put_slot(*slot, account)?;
            }
        }

        let height = store.height()? + diff.height_diff;
        store.set_height(height)?;
        store.commit()?;
        debug!(height, "block diff committed");
        Ok(())
    }

    /// Reset every table to empty and the height to 0, then commit. Used for
    /// full-state rebuilds such as a resync from genesis.
    pub fn clear(&self) -> Result<()> {
        let store = self.store.write();
        store.clear()?;
        store.commit()?;
        info!("ledger state cleared");
        Ok(())
    }
}
