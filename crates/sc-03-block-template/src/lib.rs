//! # SC-03 Block Template Generator
//!
//! Turns a mempool snapshot into a candidate shard block.
//!
//! **Subsystem ID:** 3  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Select, validate, classify and order pending transactions while keeping
//! the shared treasury resources inside their caps:
//! - Bond sales stay inside the selling window and the bond supply
//! - Buy-backs wait for maturity and fit in the treasury balance
//! - Stablecoin-bank token issuance stays under its sale cap
//! - At most `max_txs_in_block` mempool transactions are admitted
//!
//! Treasury payouts (dividends, crowdsale, committee refunds) are appended
//! after selection and do not count against the ceiling.
//!
//! ## Build Flow
//!
//! ```text
//! pending txs ──► shard filter ──► self-validation ──► metadata rules
//!                                                           │
//!             ┌─────────────────────────────────────────────┘
//!             ▼
//!   check_admission (per metadata kind) ──► groups + accumulators
//!             │
//!             ▼
//!   bank dividend ─► gov dividend ─► crowdsale ─► committee refunds
//!             │
//!             ▼
//!   assemble_block: buy-back payouts, inbound bundles, sealed roots
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! sc-03-block-template/
//! ├── domain/          # Context, accumulators, admission checks, payouts
//! ├── ports/           # BlockTemplateApi, chain/verifier/treasury ports
//! ├── adapters/        # DividendBuilder, structural verifiers
//! ├── config.rs        # TemplateConfig
//! ├── error.rs         # TemplateError, SubBuildError
//! └── service.rs       # BlockTemplateGenerator
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{DividendBuilder, MempoolMetadataValidator, StructuralTxVerifier};
pub use config::{DividendConfig, TemplateConfig, DEFAULT_MAX_TXS_IN_BLOCK};
pub use domain::{
    buy_back_payout_txs, check_admission, Accumulators, Admission, AdmissionError, BlockDraft,
    BlockTemplate, BuildContext, BuyBackFromInfo, SellingBonds, StabilityParams, TxGroups,
};
pub use error::{SubBuildError, TemplateError, TemplateResult};
pub use ports::{
    BlockTemplateApi, CrowdsaleBuild, MetadataValidator, NoTreasury, SubBuild,
    TemplateChainReader, TokenHolderSource, TokenHoldings, TreasuryProcessors, TreasuryRequest,
    TxVerifier,
};
pub use service::BlockTemplateGenerator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
