use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors that can occur when parsing a Ledra address string.
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 'l'")]
    InvalidPrefix,
    #[error("address payload is not valid base58")]
    InvalidBase58(#[from] bs58::decode::Error),
    #[error("address payload must be exactly {expected} bytes, got {actual}")]
    InvalidPayloadLength { expected: usize, actual: usize },
}

/// Number of raw bytes contained in an address.
pub const ADDRESS_BYTES: usize = 32;

/// Prefix character carried by every encoded address.
pub const ADDRESS_PREFIX: char = 'l';

/// Encode a 32-byte account identifier into the human readable Ledra format.
///
/// The encoded address always begins with the character `l` followed by the
/// base58 representation of the raw bytes.
pub fn encode_address(bytes: &[u8; ADDRESS_BYTES]) -> String {
    let mut encoded = String::new();
    encoded.push(ADDRESS_PREFIX);
    encoded.push_str(&bs58::encode(bytes).into_string());
    encoded
}

/// Attempt to decode a human readable Ledra address string into the raw bytes.
pub fn decode_address(address: &str) -> Result<[u8; ADDRESS_BYTES], AddressError> {
    let payload = address
        .strip_prefix(ADDRESS_PREFIX)
        .ok_or(AddressError::InvalidPrefix)?;

    let decoded = bs58::decode(payload).into_vec()?;
    let actual = decoded.len();

    let bytes: [u8; ADDRESS_BYTES] =
        decoded
            .try_into()
            .map_err(|_| AddressError::InvalidPayloadLength {
                expected: ADDRESS_BYTES,
                actual,
            })?;

    Ok(bytes)
}

/// Check whether the provided string is a valid Ledra address.
pub fn is_valid_address(address: &str) -> bool {
    decode_address(address).is_ok()
}

/// Account identifier, serialised as its string form in JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Address(pub [u8; ADDRESS_BYTES]);

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(value: [u8; ADDRESS_BYTES]) -> Self {
        Address(value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        encode_address(&value.0)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        decode_address(&value).map(Address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_address(&self.0))
    }
}
