//! Block diffs and the merge algebra used to fold them into stored state.
//!
//! A [`BlockDiff`] carries the state changes attributable to one or more
//! freshly applied blocks. Accumulating value types ([`OrderFill`],
//! [`Portfolio`], [`AssetInfo`]) expose an explicit pure `combine` function
//! with an explicit identity; the merge engine folds a diff onto stored
//! state with the stored value as the accumulator, using the identity when
//! the key is absent. `combine` must stay associative and commutative so
//! that applying two diffs in either order equals applying their
//! combination.

use crate::address::Address;
use crate::ids::{AssetId, LeaseId, OrderId, SlotId, TxId};
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Accumulated volume and fee of an order across all of its fills.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFill {
    pub volume: i64,
    pub fee: i64,
}

impl OrderFill {
    /// The zero fill, used when no fill is stored yet.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Fold another fill delta into this one, component-wise.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            volume: self.volume.saturating_add(other.volume),
            fee: self.fee.saturating_add(other.fee),
        }
    }
}

/// Lease amounts flowing into and out of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInfo {
    pub lease_in: i64,
    pub lease_out: i64,
}

/// An account's aggregate holdings: native balance, lease amounts, and
/// per-asset balances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub balance: i64,
    pub lease_info: LeaseInfo,
    pub assets: HashMap<AssetId, i64>,
}

impl Portfolio {
    /// The empty portfolio, used when an account has no stored portfolio yet.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Fold another portfolio delta into this one. Balances, lease amounts
    /// and per-asset balances all add component-wise; an asset absent on
    /// either side counts as zero.
    pub fn combine(&self, other: &Self) -> Self {
        let mut assets = self.assets.clone();
        for (asset, delta) in &other.assets {
            let entry = assets.entry(*asset).or_insert(0);
            *entry = entry.saturating_add(*delta);
        }

        Self {
            balance: self.balance.saturating_add(other.balance),
            lease_info: LeaseInfo {
                lease_in: self.lease_info.lease_in.saturating_add(other.lease_info.lease_in),
                lease_out: self
                    .lease_info
                    .lease_out
                    .saturating_add(other.lease_info.lease_out),
            },
            assets,
        }
    }
}

/// An issued asset's mutable metadata: whether it can still be reissued and
/// its total outstanding volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub is_reissuable: bool,
    pub volume: i64,
}

impl AssetInfo {
    /// The identity element: reissuable with zero volume. Absent asset info
    /// must combine as a no-op, and `true` is the unit of AND.
    pub fn identity() -> Self {
        Self {
            is_reissuable: true,
            volume: 0,
        }
    }

    /// Fold another asset-info delta into this one. Volumes add; the
    /// reissuable flags combine with AND, so once reissuance is revoked it
    /// stays revoked.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            is_reissuable: self.is_reissuable && other.is_reissuable,
            volume: self.volume.saturating_add(other.volume),
        }
    }
}

/// Deployment status of a named contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Enabled,
    Disabled,
}

/// A named contract: status, owning account, and content bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractInfo {
    pub status: ContractStatus,
    pub account: Address,
    #[serde(with = "serde_bytes")]
    pub content: Vec<u8>,
}

/// Historical record of an account's balance and derived balances at a
/// specific height, used for stake- and time-weighted calculations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub prev_height: u64,
    pub balance: i64,
    pub effective_balance: i64,
    pub weighted_balance: i64,
}

/// The per-kind state changes carried by a block diff. Keys are unique and
/// insertion order is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct TxsDiff {
    /// New transactions with the height they were included at.
    pub transactions: HashMap<TxId, (u64, Transaction)>,
    /// Order fill deltas; accumulate onto stored fills.
    pub order_fills: HashMap<OrderId, OrderFill>,
    /// Portfolio deltas; accumulate onto stored portfolios.
    pub portfolios: HashMap<Address, Portfolio>,
    /// Asset-info deltas; accumulate onto stored asset infos.
    pub issued_assets: HashMap<AssetId, AssetInfo>,
    /// Transaction ids introduced per account, most recent first; appended
    /// to the account's stored index.
    pub account_transaction_ids: HashMap<Address, Vec<TxId>>,
    /// Alias assignments; last write wins. Uniqueness is enforced upstream.
    pub aliases: HashMap<String, Address>,
    /// Contract deployments and updates; last write wins.
    pub contracts: HashMap<String, ContractInfo>,
    /// Generic account-scoped key/value entries; last write wins.
    pub db_entries: HashMap<String, Vec<u8>>,
    /// Lease activity flags; last write wins.
    pub lease_state: HashMap<LeaseId, bool>,
    /// Slot ownership: empty bytes release the slot, non-empty bytes
    /// assign or overwrite it.
    pub slot_ids: HashMap<SlotId, Vec<u8>>,
}

/// The unit of work consumed by the merge engine: produced externally,
/// applied exactly once, then discarded.
#[derive(Debug, Clone, Default)]
pub struct BlockDiff {
    /// Number of blocks this diff represents.
    pub height_diff: u64,
    /// Per-kind state changes.
    pub txs_diff: TxsDiff,
    /// Balance snapshots per account, keyed by height.
    pub snapshots: HashMap<Address, BTreeMap<u64, BalanceSnapshot>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_fill_identity_is_neutral() {
        let fill = OrderFill {
            volume: 10,
            fee: -3,
        };
        assert_eq!(OrderFill::identity().combine(&fill), fill);
        assert_eq!(fill.combine(&OrderFill::identity()), fill);
    }

    #[test]
    fn asset_info_revoked_stays_revoked() {
        let revoked = AssetInfo {
            is_reissuable: false,
            volume: 100,
        };
        let reissue = AssetInfo {
            is_reissuable: true,
            volume: 50,
        };
        let combined = revoked.combine(&reissue);
        assert!(!combined.is_reissuable);
        assert_eq!(combined.volume, 150);
    }

    #[test]
    fn portfolio_combines_asset_maps() {
        let x = AssetId([1u8; 32]);
        let y = AssetId([2u8; 32]);

        let mut a = Portfolio::identity();
        a.balance = 100;
        a.assets.insert(x, 5);

        let mut b = Portfolio::identity();
        b.balance = -30;
        b.lease_info.lease_in = 7;
        b.assets.insert(x, -2);
        b.assets.insert(y, 9);

        let combined = a.combine(&b);
        assert_eq!(combined.balance, 70);
        assert_eq!(combined.lease_info.lease_in, 7);
        assert_eq!(combined.assets[&x], 3);
        assert_eq!(combined.assets[&y], 9);
    }

    #[test]
    fn portfolio_serialises_with_string_asset_keys() {
        let mut portfolio = Portfolio::identity();
        portfolio.assets.insert(AssetId([0xAAu8; 32]), 12);

        let json = serde_json::to_string(&portfolio).expect("portfolio serialises");
        assert!(json.contains(&"aa".repeat(32)));
    }

    mod laws {
        use super::*;
        use proptest::prelude::*;

        // Deltas stay far from i64 bounds so saturation never disturbs the
        // algebra on the tested domain.
        const DELTA: std::ops::Range<i64> = -1_000_000_000_000..1_000_000_000_000;

        fn order_fill() -> impl Strategy<Value = OrderFill> {
            (DELTA, DELTA).prop_map(|(volume, fee)| OrderFill { volume, fee })
        }

        fn asset_info() -> impl Strategy<Value = AssetInfo> {
            (any::<bool>(), DELTA).prop_map(|(is_reissuable, volume)| AssetInfo {
                is_reissuable,
                volume,
            })
        }

        fn asset_id() -> impl Strategy<Value = AssetId> {
            any::<u8>().prop_map(|b| AssetId([b; 32]))
        }

        fn portfolio() -> impl Strategy<Value = Portfolio> {
            (
                DELTA,
                DELTA,
                DELTA,
                proptest::collection::hash_map(asset_id(), DELTA, 0..4),
            )
                .prop_map(|(balance, lease_in, lease_out, assets)| Portfolio {
                    balance,
                    lease_info: LeaseInfo {
                        lease_in,
                        lease_out,
                    },
                    assets,
                })
        }

        proptest! {
            #[test]
            fn order_fill_commutative(a in order_fill(), b in order_fill()) {
                prop_assert_eq!(a.combine(&b), b.combine(&a));
            }

            #[test]
            fn order_fill_associative(a in order_fill(), b in order_fill(), c in order_fill()) {
                prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
            }

            #[test]
            fn order_fill_identity(a in order_fill()) {
                prop_assert_eq!(OrderFill::identity().combine(&a), a);
            }

            #[test]
            fn asset_info_commutative(a in asset_info(), b in asset_info()) {
                prop_assert_eq!(a.combine(&b), b.combine(&a));
            }

            #[test]
            fn asset_info_associative(a in asset_info(), b in asset_info(), c in asset_info()) {
                prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
            }

            #[test]
            fn asset_info_identity(a in asset_info()) {
                prop_assert_eq!(AssetInfo::identity().combine(&a), a);
            }

            #[test]
            fn portfolio_commutative(a in portfolio(), b in portfolio()) {
                prop_assert_eq!(a.combine(&b), b.combine(&a));
            }

            #[test]
            fn portfolio_associative(a in portfolio(), b in portfolio(), c in portfolio()) {
                prop_assert_eq!(a.combine(&b).combine(&c), a.combine(&b.combine(&c)));
            }

            #[test]
            fn portfolio_identity(a in portfolio()) {
                prop_assert_eq!(Portfolio::identity().combine(&a), a);
            }
        }
    }
}
