//! Stateless stand-ins for the proof system and the metadata rule catalog.
//!
//! Neither inspects proof bytes. They enforce the structural rules every
//! node agrees on and leave cryptographic validity to the real adapters.

use crate::ports::{MetadataValidator, TemplateChainReader, TxVerifier};
use sc_01_block_model::{Metadata, Transaction};
use shared_types::{KeyValueStore, ShardId};

/// Structural transaction checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralTxVerifier;

impl TxVerifier for StructuralTxVerifier {
    fn validate_by_itself(
        &self,
        tx: &Transaction,
        is_private: bool,
        _db: &dyn KeyValueStore,
        _chain: &dyn TemplateChainReader,
        _shard_id: ShardId,
    ) -> bool {
        if is_private && tx.base().proof.is_empty() {
            return false;
        }
        if tx.base().sender.as_bytes().is_empty() {
            return false;
        }
        tx.metadata().map_or(true, Metadata::validate_by_itself)
    }
}

/// Metadata rules for transactions arriving from the mempool.
///
/// Responses and dividends are issued by producers and are refused when a
/// user submits them.
#[derive(Debug, Clone, Copy, Default)]
pub struct MempoolMetadataValidator;

impl MetadataValidator for MempoolMetadataValidator {
    fn validate_before_new_block(
        &self,
        tx: &Transaction,
        _chain: &dyn TemplateChainReader,
        _shard_id: ShardId,
    ) -> bool {
        match tx.metadata() {
            None => true,
            Some(Metadata::BuySellResponse(_))
            | Some(Metadata::BuyBackResponse(_))
            | Some(Metadata::Dividend(_)) => false,
            Some(meta) => meta.validate_by_itself(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockChainReader;
    use sc_01_block_model::{BuyBackRequest, BuyBackResponse, Tx};
    use shared_types::PublicKey;

    fn key() -> PublicKey {
        PublicKey::from_bytes(vec![4, 2])
    }

    #[test]
    fn test_private_tx_needs_proof() {
        let chain = MockChainReader::new();
        let db = chain.database();
        let mut base = Tx::new(key(), 1, 0);
        base.privacy = true;
        let tx = Transaction::Normal(base.clone());
        assert!(!StructuralTxVerifier.validate_by_itself(&tx, true, db.as_ref(), &chain, 0));

        base.proof = vec![1, 2, 3];
        let tx = Transaction::Normal(base);
        assert!(StructuralTxVerifier.validate_by_itself(&tx, true, db.as_ref(), &chain, 0));
    }

    #[test]
    fn test_metadata_sanity_applied() {
        let chain = MockChainReader::new();
        let db = chain.database();
        let tx = Transaction::Normal(Tx::new(key(), 1, 0).with_metadata(
            Metadata::BuyBackRequest(BuyBackRequest {
                payment_address: key(),
                amount: 0,
            }),
        ));
        assert!(!StructuralTxVerifier.validate_by_itself(&tx, false, db.as_ref(), &chain, 0));
        assert!(!MempoolMetadataValidator.validate_before_new_block(&tx, &chain, 0));
    }

    #[test]
    fn test_producer_metadata_refused_from_mempool() {
        let chain = MockChainReader::new();
        let tx = Transaction::Normal(Tx::new(key(), 1, 0).with_metadata(
            Metadata::BuyBackResponse(BuyBackResponse {
                requested_tx_id: [1u8; 32],
            }),
        ));
        assert!(!MempoolMetadataValidator.validate_before_new_block(&tx, &chain, 0));

        let plain = Transaction::Normal(Tx::new(key(), 1, 0));
        assert!(MempoolMetadataValidator.validate_before_new_block(&plain, &chain, 0));
    }
}
