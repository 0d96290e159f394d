//! # Transactions
//!
//! The three transaction kinds a shard body may carry. Validity of the
//! attached proof is decided by the privacy subsystem; this module only
//! defines the data every node hashes and routes identically.

use super::coins::OutputCoin;
use super::encoding::Canonical;
use super::metadata::{Metadata, MetadataType};
use serde::{Deserialize, Serialize};
use shared_types::{shard_for_last_byte, Hash, PublicKey, ShardId};
use std::fmt;

/// Wire tag of a normal transaction.
pub const TX_NORMAL_TYPE: &str = "n";
/// Wire tag of a salary (treasury-issued) transaction.
pub const TX_SALARY_TYPE: &str = "s";
/// Wire tag of a custom-token transaction.
pub const TX_CUSTOM_TOKEN_TYPE: &str = "t";

/// Every tag accepted by the body decoder.
pub const KNOWN_TX_TYPES: [&str; 3] = [TX_NORMAL_TYPE, TX_SALARY_TYPE, TX_CUSTOM_TOKEN_TYPE];

/// Fields common to every transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    /// Format version.
    pub version: u8,
    /// Creation time, unix seconds.
    pub lock_time: i64,
    /// Fee paid to the producer.
    pub fee: u64,
    /// Sender key. Its last byte routes the transaction.
    pub sender: PublicKey,
    /// Whether the proof hides amounts and parties.
    #[serde(default)]
    pub privacy: bool,
    /// Created coins.
    #[serde(default)]
    pub outputs: Vec<OutputCoin>,
    /// Optional metadata.
    #[serde(default)]
    pub metadata: Option<Metadata>,
    /// Opaque validity proof.
    #[serde(default)]
    pub proof: Vec<u8>,
    /// Sender signature. Not part of the hash.
    #[serde(default)]
    pub sig: Vec<u8>,
}

impl Tx {
    /// Unsigned, proof-less transaction.
    pub fn new(sender: PublicKey, fee: u64, lock_time: i64) -> Self {
        Self {
            version: 1,
            lock_time,
            fee,
            sender,
            privacy: false,
            outputs: Vec::new(),
            metadata: None,
            proof: Vec::new(),
            sig: Vec::new(),
        }
    }

    /// Attach metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach outputs.
    pub fn with_outputs(mut self, outputs: Vec<OutputCoin>) -> Self {
        self.outputs = outputs;
        self
    }

    fn write_canonical(&self, c: &mut Canonical) {
        c.u8(self.version)
            .u64(self.lock_time as u64)
            .u64(self.fee)
            .bytes(self.sender.as_bytes())
            .u8(u8::from(self.privacy))
            .u32(self.outputs.len() as u32);
        for out in &self.outputs {
            out.write_canonical(c);
        }
        match &self.metadata {
            Some(meta) => c.hash(&meta.hash()),
            None => c.hash(&[0u8; 32]),
        };
        c.bytes(&self.proof);
    }
}

/// Custom-token input spending a prior token output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTokenVin {
    /// Transaction holding the spent token output.
    pub tx_custom_token_id: Hash,
    /// Output index within that transaction.
    pub vout_index: u32,
    /// Owner of the spent output.
    pub payment_address: PublicKey,
    /// Owner signature.
    #[serde(default)]
    pub signature: Vec<u8>,
}

/// Custom-token output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTokenVout {
    /// Receiver.
    pub payment_address: PublicKey,
    /// Token amount.
    pub value: u64,
}

/// Token movement attached to a custom-token transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTokenData {
    /// Token identifier.
    pub property_id: Hash,
    /// Display name.
    #[serde(default)]
    pub property_name: String,
    /// Total token amount moved.
    pub amount: u64,
    /// Spent token outputs.
    #[serde(default)]
    pub vins: Vec<TxTokenVin>,
    /// Created token outputs.
    #[serde(default)]
    pub vouts: Vec<TxTokenVout>,
}

impl TxTokenData {
    fn write_canonical(&self, c: &mut Canonical) {
        c.hash(&self.property_id)
            .bytes(self.property_name.as_bytes())
            .u64(self.amount)
            .u32(self.vins.len() as u32);
        for vin in &self.vins {
            c.hash(&vin.tx_custom_token_id)
                .u32(vin.vout_index)
                .bytes(vin.payment_address.as_bytes());
        }
        c.u32(self.vouts.len() as u32);
        for vout in &self.vouts {
            c.bytes(vout.payment_address.as_bytes()).u64(vout.value);
        }
    }
}

/// Custom-token transaction: a base transaction paying the fee plus the
/// token movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenTx {
    /// Fee-paying base transaction.
    pub tx: Tx,
    /// Token movement.
    pub token_data: TxTokenData,
}

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    /// Ordinary transfer.
    Normal,
    /// Treasury-issued payout.
    Salary,
    /// Custom-token transfer.
    CustomToken,
}

impl TxKind {
    /// Wire tag.
    pub fn tag(&self) -> &'static str {
        match self {
            TxKind::Normal => TX_NORMAL_TYPE,
            TxKind::Salary => TX_SALARY_TYPE,
            TxKind::CustomToken => TX_CUSTOM_TOKEN_TYPE,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A transaction of any kind, tagged on the wire by `Type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Transaction {
    /// Ordinary transfer.
    #[serde(rename = "n")]
    Normal(Tx),
    /// Treasury-issued payout.
    #[serde(rename = "s")]
    Salary(Tx),
    /// Custom-token transfer.
    #[serde(rename = "t")]
    CustomToken(TokenTx),
}

impl Transaction {
    /// Kind of this transaction.
    pub fn kind(&self) -> TxKind {
        match self {
            Transaction::Normal(_) => TxKind::Normal,
            Transaction::Salary(_) => TxKind::Salary,
            Transaction::CustomToken(_) => TxKind::CustomToken,
        }
    }

    /// Common fields.
    pub fn base(&self) -> &Tx {
        match self {
            Transaction::Normal(tx) | Transaction::Salary(tx) => tx,
            Transaction::CustomToken(t) => &t.tx,
        }
    }

    /// Token movement, for custom-token transactions.
    pub fn token_data(&self) -> Option<&TxTokenData> {
        match self {
            Transaction::CustomToken(t) => Some(&t.token_data),
            _ => None,
        }
    }

    /// Double hash of the canonical encoding. Signatures are excluded.
    pub fn hash(&self) -> Hash {
        let mut c = Canonical::new();
        c.text(self.kind().tag());
        self.base().write_canonical(&mut c);
        if let Transaction::CustomToken(t) = self {
            t.token_data.write_canonical(&mut c);
        }
        c.digest()
    }

    /// Fee paid to the producer.
    pub fn fee(&self) -> u64 {
        self.base().fee
    }

    /// Last byte of the sender key.
    pub fn sender_last_byte(&self) -> u8 {
        self.base().sender.last_byte()
    }

    /// Shard this transaction is routed to.
    pub fn shard_id(&self, shard_count: u8) -> ShardId {
        shard_for_last_byte(self.sender_last_byte(), shard_count)
    }

    /// Metadata, if any.
    pub fn metadata(&self) -> Option<&Metadata> {
        self.base().metadata.as_ref()
    }

    /// Metadata discriminant, if any.
    pub fn metadata_type(&self) -> Option<MetadataType> {
        self.metadata().map(Metadata::kind)
    }

    /// Whether the proof is a privacy proof.
    pub fn is_privacy(&self) -> bool {
        self.base().privacy
    }

    /// Coins created by this transaction.
    pub fn outputs(&self) -> &[OutputCoin] {
        &self.base().outputs
    }
}
