//! # Transaction Metadata
//!
//! Closed catalog of the metadata a transaction may carry. Adding a kind is a
//! compile-time change: every `match` over [`Metadata`] must handle it.
//!
//! Each kind hashes as a record string (decimal numbers, hex hashes, raw
//! bytes) followed by its type code, double hashed.

use super::encoding::Canonical;
use serde::{Deserialize, Serialize};
use shared_types::{hash_to_hex, Hash, PublicKey};
use std::fmt;

const fn token_id(tag: u8) -> Hash {
    let mut id = [0u8; 32];
    id[0] = tag;
    id
}

/// Stablecoin-bank token, the restricted asset for issuance.
pub const DCB_TOKEN_ID: Hash = token_id(1);

/// Government token.
pub const GOV_TOKEN_ID: Hash = token_id(2);

/// Native coin.
pub const NATIVE_COIN_ID: Hash = token_id(4);

/// Discriminant of a [`Metadata`] value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataType {
    /// Buy bonds or tokens from the treasury.
    BuySellRequest,
    /// Treasury response to a buy request.
    BuySellResponse,
    /// Sell matured bonds back to the treasury.
    BuyBackRequest,
    /// Treasury payout for a buy-back.
    BuyBackResponse,
    /// Deposit to be issued as tokens.
    IssuingRequest,
    /// Oracle board membership change.
    UpdatingOracleBoard,
    /// Multi-signature spending registration.
    MultiSigsRegistration,
    /// Dividend payout to a token holder.
    Dividend,
    /// Board governance action, validated by the governance catalog.
    Governance,
}

impl MetadataType {
    /// Numeric code folded into metadata hashes.
    pub fn code(&self) -> u32 {
        match self {
            MetadataType::BuySellRequest => 1,
            MetadataType::BuySellResponse => 2,
            MetadataType::BuyBackRequest => 3,
            MetadataType::BuyBackResponse => 4,
            MetadataType::IssuingRequest => 5,
            MetadataType::UpdatingOracleBoard => 6,
            MetadataType::MultiSigsRegistration => 7,
            MetadataType::Dividend => 8,
            MetadataType::Governance => 9,
        }
    }
}

impl fmt::Display for MetadataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Buy bonds from the treasury during the selling window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuySellRequest {
    /// Receiver of the bought tokens.
    pub payment_address: PublicKey,
    /// Token being bought.
    pub token_id: Hash,
    /// Quantity.
    pub amount: u64,
    /// Unit price offered.
    pub buy_price: u64,
}

/// Treasury answer to a [`BuySellRequest`], carrying the bond terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuySellResponse {
    /// Request transaction this answers.
    pub requested_tx_id: Hash,
    /// Height the selling window opened.
    pub start_selling_at: u64,
    /// Blocks after `start_selling_at` before buy-back is allowed.
    pub maturity: u64,
    /// Unit price the treasury pays back.
    pub buy_back_price: u64,
    /// Compound bond identifier.
    #[serde(default)]
    pub bond_id: Vec<u8>,
}

/// Sell bonds back to the treasury. The bonds spent are the custom-token
/// inputs of the carrying transaction; the first input names the prior
/// transaction holding the [`BuySellResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyBackRequest {
    /// Receiver of the payout.
    pub payment_address: PublicKey,
    /// Quantity sold back.
    pub amount: u64,
}

/// Treasury payout for a buy-back request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyBackResponse {
    /// Buy-back request transaction being paid.
    pub requested_tx_id: Hash,
}

/// Deposit native coin to receive tokens of `asset_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuingRequest {
    /// Receiver of the issued tokens.
    pub receiver_address: PublicKey,
    /// Native coin deposited.
    pub deposited_amount: u64,
    /// Asset requested.
    pub asset_type: Hash,
}

/// Direction of an oracle board change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleBoardAction {
    /// Add the listed keys.
    Add,
    /// Remove the listed keys.
    Remove,
}

/// Oracle board membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatingOracleBoard {
    /// Add or remove.
    pub action: OracleBoardAction,
    /// Keys affected.
    pub oracle_pub_keys: Vec<PublicKey>,
}

/// Register a multi-signature spending policy for an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigsRegistration {
    /// Address the policy applies to.
    pub payment_address: PublicKey,
    /// Keys allowed to co-sign.
    pub spendable_members: Vec<PublicKey>,
    /// Signatures needed to spend.
    pub required_sigs: u8,
}

/// Dividend payment to a token holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendPayout {
    /// Token whose holders are paid.
    pub token_id: Hash,
    /// Payout round, the block height it was built at.
    pub payout_id: u64,
}

/// Board that owns a governance action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Board {
    /// Stablecoin bank board.
    Dcb,
    /// Government board.
    Gov,
}

/// Governance action. The payload is interpreted by the governance rule
/// catalog, never by the consensus core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceAction {
    /// Owning board.
    pub board: Board,
    /// Action name, e.g. a proposal or vote kind.
    pub action: String,
    /// Opaque payload.
    #[serde(default)]
    pub payload: Vec<u8>,
}

/// Transaction metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Metadata {
    /// See [`BuySellRequest`].
    BuySellRequest(BuySellRequest),
    /// See [`BuySellResponse`].
    BuySellResponse(BuySellResponse),
    /// See [`BuyBackRequest`].
    BuyBackRequest(BuyBackRequest),
    /// See [`BuyBackResponse`].
    BuyBackResponse(BuyBackResponse),
    /// See [`IssuingRequest`].
    IssuingRequest(IssuingRequest),
    /// See [`UpdatingOracleBoard`].
    UpdatingOracleBoard(UpdatingOracleBoard),
    /// See [`MultiSigsRegistration`].
    MultiSigsRegistration(MultiSigsRegistration),
    /// See [`DividendPayout`].
    Dividend(DividendPayout),
    /// See [`GovernanceAction`].
    Governance(GovernanceAction),
}

impl Metadata {
    /// Discriminant.
    pub fn kind(&self) -> MetadataType {
        match self {
            Metadata::BuySellRequest(_) => MetadataType::BuySellRequest,
            Metadata::BuySellResponse(_) => MetadataType::BuySellResponse,
            Metadata::BuyBackRequest(_) => MetadataType::BuyBackRequest,
            Metadata::BuyBackResponse(_) => MetadataType::BuyBackResponse,
            Metadata::IssuingRequest(_) => MetadataType::IssuingRequest,
            Metadata::UpdatingOracleBoard(_) => MetadataType::UpdatingOracleBoard,
            Metadata::MultiSigsRegistration(_) => MetadataType::MultiSigsRegistration,
            Metadata::Dividend(_) => MetadataType::Dividend,
            Metadata::Governance(_) => MetadataType::Governance,
        }
    }

    /// Record-string digest.
    pub fn hash(&self) -> Hash {
        let mut c = Canonical::new();
        match self {
            Metadata::BuySellRequest(m) => {
                c.text(&m.payment_address.to_base58())
                    .text(&hash_to_hex(&m.token_id))
                    .decimal(m.amount)
                    .decimal(m.buy_price);
            }
            Metadata::BuySellResponse(m) => {
                c.text(&hash_to_hex(&m.requested_tx_id))
                    .decimal(m.start_selling_at)
                    .decimal(m.maturity)
                    .decimal(m.buy_back_price)
                    .raw(&m.bond_id);
            }
            Metadata::BuyBackRequest(m) => {
                c.text(&m.payment_address.to_base58()).decimal(m.amount);
            }
            Metadata::BuyBackResponse(m) => {
                c.text(&hash_to_hex(&m.requested_tx_id));
            }
            Metadata::IssuingRequest(m) => {
                c.text(&m.receiver_address.to_base58())
                    .decimal(m.deposited_amount)
                    .text(&hash_to_hex(&m.asset_type));
            }
            Metadata::UpdatingOracleBoard(m) => {
                c.decimal(m.action as u8);
                for key in &m.oracle_pub_keys {
                    c.text(&key.to_base58());
                }
            }
            Metadata::MultiSigsRegistration(m) => {
                c.text(&m.payment_address.to_base58());
                for key in &m.spendable_members {
                    c.text(&key.to_base58());
                }
                c.decimal(m.required_sigs);
            }
            Metadata::Dividend(m) => {
                c.text(&hash_to_hex(&m.token_id)).decimal(m.payout_id);
            }
            Metadata::Governance(m) => {
                c.decimal(m.board as u8).text(&m.action).raw(&m.payload);
            }
        }
        c.decimal(self.kind().code());
        c.digest()
    }

    /// Stateless sanity checks that need neither chain state nor the block
    /// being built.
    pub fn validate_by_itself(&self) -> bool {
        match self {
            Metadata::BuySellRequest(m) => m.amount > 0,
            Metadata::BuyBackRequest(m) => m.amount > 0,
            Metadata::IssuingRequest(m) => m.deposited_amount > 0,
            Metadata::MultiSigsRegistration(m) => {
                m.required_sigs > 0 && (m.required_sigs as usize) <= m.spendable_members.len()
            }
            Metadata::UpdatingOracleBoard(m) => !m.oracle_pub_keys.is_empty(),
            Metadata::BuySellResponse(_)
            | Metadata::BuyBackResponse(_)
            | Metadata::Dividend(_)
            | Metadata::Governance(_) => true,
        }
    }
}
