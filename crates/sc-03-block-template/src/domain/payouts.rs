//! Treasury-issued salary transactions.

use super::context::BuyBackFromInfo;
use sc_01_block_model::{BuyBackResponse, Metadata, OutputCoin, Transaction, Tx};
use shared_types::PublicKey;

/// Salary transaction from `producer` paying `amount` to `receiver`.
///
/// Salary transactions carry no fee and no lock time, so two producers
/// building the same payout produce the same hash.
pub fn salary_payout(
    producer: &PublicKey,
    receiver: &PublicKey,
    amount: u64,
    metadata: Metadata,
) -> Transaction {
    Transaction::Salary(
        Tx::new(producer.clone(), 0, 0)
            .with_outputs(vec![OutputCoin::new(receiver.clone(), amount)])
            .with_metadata(metadata),
    )
}

/// One salary transaction per buy-back, paying price times quantity and
/// answering the request with a [`BuyBackResponse`].
pub fn buy_back_payout_txs(infos: &[BuyBackFromInfo], producer: &PublicKey) -> Vec<Transaction> {
    infos
        .iter()
        .map(|info| {
            salary_payout(
                producer,
                &info.payment_address,
                info.payout(),
                Metadata::BuyBackResponse(BuyBackResponse {
                    requested_tx_id: info.requested_tx_id,
                }),
            )
        })
        .collect()
}
