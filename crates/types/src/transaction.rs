//! The signed transaction family and its canonical binary layout.
//!
//! Every transaction kind shares the same contract: a leading type-tag byte,
//! a sender public key, a fee, a timestamp, and a trailing Ed25519 signature
//! computed over everything before it (the "signable bytes"). The encoded
//! form is the authoritative representation both on the wire and on disk;
//! decoding re-runs the business validation so that a record which could not
//! legally be constructed cannot be decoded either.

use crate::ids::{AssetId, TxId, ASSET_ID_LENGTH};
use ledra_crypto::{hash_bytes, KeyPair, PUBLIC_KEY_LENGTH, SIGNATURE_LENGTH};

/// Leading type-tag byte identifying each transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransactionType {
    Burn = 6,
}

impl TransactionType {
    /// Resolve a wire tag byte into a known transaction kind.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            6 => Some(TransactionType::Burn),
            _ => None,
        }
    }

    /// The wire tag byte for this kind.
    pub fn tag(self) -> u8 {
        self as u8
    }
}

/// Business-rule violations raised at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("quantity must not be negative, got {0}")]
    NegativeAmount(i64),
    #[error("fee must be positive, got {0}")]
    InsufficientFee(i64),
}

/// Failures raised while decoding a binary transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("empty transaction data")]
    Empty,
    #[error("transaction must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("expected transaction type tag {expected}, got {actual}")]
    WrongTypeTag { expected: u8, actual: u8 },
    #[error("unknown transaction type tag {0}")]
    UnknownTypeTag(u8),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A signed transaction, tagged by its leading type byte.
///
/// Variants share the common signed-record shape: sender, fee, timestamp and
/// signature, plus `signable_bytes`/`to_bytes`/`id` over the binary layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    Burn(BurnTransaction),
}

impl Transaction {
    /// Decode a transaction from its binary form, dispatching on the tag byte.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let tag = *bytes.first().ok_or(DecodeError::Empty)?;
        match TransactionType::from_tag(tag) {
            Some(TransactionType::Burn) => BurnTransaction::from_bytes(bytes).map(Self::Burn),
            None => Err(DecodeError::UnknownTypeTag(tag)),
        }
    }

    pub fn tx_type(&self) -> TransactionType {
        match self {
            Self::Burn(_) => TransactionType::Burn,
        }
    }

    /// Sender public key.
    pub fn sender(&self) -> &[u8; PUBLIC_KEY_LENGTH] {
        match self {
            Self::Burn(tx) => &tx.sender,
        }
    }

    pub fn fee(&self) -> i64 {
        match self {
            Self::Burn(tx) => tx.fee,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Self::Burn(tx) => tx.timestamp,
        }
    }

    pub fn signature(&self) -> &[u8; SIGNATURE_LENGTH] {
        match self {
            Self::Burn(tx) => &tx.signature,
        }
    }

    /// The exact byte sequence the signature is computed over.
    pub fn signable_bytes(&self) -> Vec<u8> {
        match self {
            Self::Burn(tx) => tx.signable_bytes(),
        }
    }

    /// Canonical binary form: `signable_bytes || signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Burn(tx) => tx.to_bytes(),
        }
    }

    /// Transaction identifier: BLAKE3 digest of the encoded form.
    pub fn id(&self) -> TxId {
        match self {
            Self::Burn(tx) => tx.id(),
        }
    }
}

/// Destroys a quantity of an issued asset held by the sender.
///
/// Layout (big-endian, fixed widths):
/// `[tag:1][sender:32][asset id:32][quantity:8][fee:8][timestamp:8][signature:64]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnTransaction {
    pub sender: [u8; PUBLIC_KEY_LENGTH],
    pub asset_id: AssetId,
    pub quantity: i64,
    pub fee: i64,
    pub timestamp: i64,
    pub signature: [u8; SIGNATURE_LENGTH],
}

impl BurnTransaction {
    /// Length of the signable portion of the encoded form.
    pub const SIGNABLE_LENGTH: usize = 1 + PUBLIC_KEY_LENGTH + ASSET_ID_LENGTH + 8 + 8 + 8;
    /// Length of the full encoded form.
    pub const ENCODED_LENGTH: usize = Self::SIGNABLE_LENGTH + SIGNATURE_LENGTH;

    /// Build a burn transaction with a caller-supplied signature.
    pub fn new(
        sender: [u8; PUBLIC_KEY_LENGTH],
        asset_id: AssetId,
        quantity: i64,
        fee: i64,
        timestamp: i64,
        signature: [u8; SIGNATURE_LENGTH],
    ) -> Result<Self, ValidationError> {
        validate(quantity, fee)?;
        Ok(Self {
            sender,
            asset_id,
            quantity,
            fee,
            timestamp,
            signature,
        })
    }

    /// Build and sign a burn transaction with the supplied key pair.
    pub fn sign(
        keypair: &KeyPair,
        asset_id: AssetId,
        quantity: i64,
        fee: i64,
        timestamp: i64,
    ) -> Result<Self, ValidationError> {
        validate(quantity, fee)?;
        let mut tx = Self {
            sender: keypair.public_key(),
            asset_id,
            quantity,
            fee,
            timestamp,
            signature: [0u8; SIGNATURE_LENGTH],
        };
        tx.signature = keypair.sign(&tx.signable_bytes());
        Ok(tx)
    }

    /// The byte sequence the signature is computed over.
    pub fn signable_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::SIGNABLE_LENGTH);
        bytes.push(TransactionType::Burn.tag());
        bytes.extend_from_slice(&self.sender);
        bytes.extend_from_slice(&self.asset_id.0);
        bytes.extend_from_slice(&self.quantity.to_be_bytes());
        bytes.extend_from_slice(&self.fee.to_be_bytes());
        bytes.extend_from_slice(&self.timestamp.to_be_bytes());
        bytes
    }

    /// Canonical binary form: `signable_bytes || signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.signable_bytes();
        bytes.extend_from_slice(&self.signature);
        bytes
    }

    /// Decode from the canonical binary form.
    ///
    /// Field widths are compile-time constants, so fields are sliced at fixed
    /// offsets. Business validation runs again before the record is returned.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() != Self::ENCODED_LENGTH {
            return Err(DecodeError::InvalidLength {
                expected: Self::ENCODED_LENGTH,
                actual: bytes.len(),
            });
        }
        let expected = TransactionType::Burn.tag();
        if bytes[0] != expected {
            return Err(DecodeError::WrongTypeTag {
                expected,
                actual: bytes[0],
            });
        }

        let mut sender = [0u8; PUBLIC_KEY_LENGTH];
        sender.copy_from_slice(&bytes[1..33]);
        let mut asset_id = [0u8; ASSET_ID_LENGTH];
        asset_id.copy_from_slice(&bytes[33..65]);
        // Slice widths are fixed above, so the conversions cannot fail.
        let quantity = i64::from_be_bytes(bytes[65..73].try_into().unwrap());
        let fee = i64::from_be_bytes(bytes[73..81].try_into().unwrap());
        let timestamp = i64::from_be_bytes(bytes[81..89].try_into().unwrap());
        let mut signature = [0u8; SIGNATURE_LENGTH];
        signature.copy_from_slice(&bytes[89..153]);

        validate(quantity, fee)?;

        Ok(Self {
            sender,
            asset_id: AssetId(asset_id),
            quantity,
            fee,
            timestamp,
            signature,
        })
    }

    /// Transaction identifier: BLAKE3 digest of the encoded form.
    pub fn id(&self) -> TxId {
        hash_bytes(&self.to_bytes())
    }
}

fn validate(quantity: i64, fee: i64) -> Result<(), ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::NegativeAmount(quantity));
    }
    if fee <= 0 {
        return Err(ValidationError::InsufficientFee(fee));
    }
    Ok(())
}
