//! Account-scoped key derivation for append-only per-account sequences.

use ledra_types::{Address, ADDRESS_BYTES};

/// Width of an account-scoped sequence key.
pub const ACCOUNT_INDEX_KEY_LENGTH: usize = ADDRESS_BYTES + 8;

/// Derive the storage key for the `index`-th entry of an account-scoped
/// sequence (transaction indices, balance-snapshot heights).
///
/// The account occupies a fixed 32-byte prefix and the index is appended
/// big-endian, so the mapping is injective over `(account, index)` pairs and
/// stable across restarts. The big-endian suffix also keeps entries of one
/// account ordered by index in a byte-ordered table.
pub fn account_index_key(account: &Address, index: u64) -> [u8; ACCOUNT_INDEX_KEY_LENGTH] {
    let mut key = [0u8; ACCOUNT_INDEX_KEY_LENGTH];
    key[..ADDRESS_BYTES].copy_from_slice(&account.0);
    key[ADDRESS_BYTES..].copy_from_slice(&index.to_be_bytes());
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_accounts_never_collide() {
        let a = Address([1u8; ADDRESS_BYTES]);
        let b = Address([2u8; ADDRESS_BYTES]);
        assert_ne!(account_index_key(&a, 0), account_index_key(&b, 0));
        assert_ne!(account_index_key(&a, 7), account_index_key(&b, 7));
    }

    #[test]
    fn distinct_indices_never_collide() {
        let account = Address([9u8; ADDRESS_BYTES]);
        assert_ne!(
            account_index_key(&account, 0),
            account_index_key(&account, 1)
        );
        assert_ne!(
            account_index_key(&account, u64::MAX),
            account_index_key(&account, u64::MAX - 1)
        );
    }

    #[test]
    fn key_is_pure() {
        let account = Address([3u8; ADDRESS_BYTES]);
        assert_eq!(
            account_index_key(&account, 42),
            account_index_key(&account, 42)
        );
    }

    #[test]
    fn index_orders_keys_within_account() {
        let account = Address([0u8; ADDRESS_BYTES]);
        let low = account_index_key(&account, 1);
        let high = account_index_key(&account, 256);
        assert!(low < high);
    }
}
