//! Fixed-width identifiers used as storage keys across the ledger.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical identifier for a transaction (32-byte digest of its encoded form).
pub type TxId = [u8; 32];
/// Identifier for a matched order on the exchange side.
pub type OrderId = [u8; 32];
/// Identifier for an open or cancelled lease.
pub type LeaseId = [u8; 32];
/// Identifier for a contend/release slot.
pub type SlotId = u64;

/// Number of raw bytes in an asset identifier.
pub const ASSET_ID_LENGTH: usize = 32;

/// Errors that can occur when parsing an asset identifier string.
#[derive(Debug, thiserror::Error)]
pub enum AssetIdError {
    #[error("asset id is not valid hexadecimal")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("asset id must be exactly {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Issued-asset identifier, serialised as a hex string so it can key JSON maps.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(pub [u8; ASSET_ID_LENGTH]);

impl From<[u8; ASSET_ID_LENGTH]> for AssetId {
    fn from(value: [u8; ASSET_ID_LENGTH]) -> Self {
        AssetId(value)
    }
}

impl From<AssetId> for String {
    fn from(value: AssetId) -> Self {
        hex::encode(value.0)
    }
}

impl TryFrom<String> for AssetId {
    type Error = AssetIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let decoded = hex::decode(&value)?;
        let actual = decoded.len();
        let bytes: [u8; ASSET_ID_LENGTH] =
            decoded
                .try_into()
                .map_err(|_| AssetIdError::InvalidLength {
                    expected: ASSET_ID_LENGTH,
                    actual,
                })?;
        Ok(AssetId(bytes))
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
