//! # Admission Checks
//!
//! Per-metadata policy applied to a transaction that already passed
//! self-validation. Each check either advances the build's accumulators and
//! returns where the transaction belongs, or leaves them untouched and
//! returns an [`AdmissionError`]. A rejected transaction never contributes
//! to any total.

use super::context::{BuildContext, BuyBackFromInfo};
use sc_01_block_model::{
    BuyBackRequest, BuySellRequest, IssuingRequest, Metadata, Transaction, DCB_TOKEN_ID,
};
use shared_types::{hash_to_hex, Hash};
use thiserror::Error;

/// Why a transaction was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    /// Bond sale window has closed
    #[error("Selling window ended at {window_end}, block height is {height}")]
    SellingWindowClosed {
        /// Block height being built
        height: u64,
        /// Last height of the window
        window_end: u64,
    },

    /// Bond purchase would exceed the bonds on sale
    #[error("Bond cap exceeded: sold {sold} + requested {requested} > {cap}")]
    BondCapExceeded {
        /// Bonds sold earlier in this build
        sold: u64,
        /// Bonds requested
        requested: u64,
        /// Bonds on sale
        cap: u64,
    },

    /// Buy-back must spend bond tokens
    #[error("Buy-back request is not a custom-token transaction")]
    NotCustomToken,

    /// Buy-back spends no token inputs
    #[error("Buy-back request has no token inputs")]
    NoTokenInputs,

    /// Referenced bond purchase is unknown
    #[error("Prior transaction {0} not found")]
    PriorTxNotFound(String),

    /// Referenced bond purchase carries no sale response
    #[error("Prior transaction {0} carries no sell response")]
    MissingSellResponse(String),

    /// Bonds have not matured
    #[error("Bonds mature at {matures_at}, block height is {height}")]
    NotMatured {
        /// Block height being built
        height: u64,
        /// Maturity height
        matures_at: u64,
    },

    /// Treasury cannot cover the buy-back
    #[error("Treasury exhausted: committed {committed} + requested {requested} > fund {fund}")]
    TreasuryExhausted {
        /// Funds committed earlier in this build
        committed: u64,
        /// Amount this buy-back commits
        requested: u64,
        /// Treasury balance
        fund: u64,
    },

    /// Issuance would exceed the tokens for sale
    #[error("Issuance cap exceeded: sold {sold} + requested {requested} > {cap}")]
    IssuanceCapExceeded {
        /// Tokens issued earlier in this build
        sold: u64,
        /// Tokens requested
        requested: u64,
        /// Tokens for sale
        cap: u64,
    },
}

/// Where an admitted transaction is filed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// No metadata-specific group.
    Plain,
    /// Bond purchase.
    BuySell,
    /// Buy-back owed by the treasury.
    BuyBack(BuyBackFromInfo),
    /// Issuance request.
    Issuing,
    /// Oracle board update.
    OracleUpdate,
    /// Multisig registration.
    MultiSig,
}

/// Apply the policy of the transaction's metadata kind.
///
/// `prior_tx` resolves transactions already on chain; only buy-backs use it.
pub fn check_admission(
    tx: &Transaction,
    ctx: &mut BuildContext,
    prior_tx: &dyn Fn(&Hash) -> Option<Transaction>,
) -> Result<Admission, AdmissionError> {
    match tx.metadata() {
        Some(Metadata::BuySellRequest(req)) => check_buy_from_treasury(req, ctx),
        Some(Metadata::BuyBackRequest(req)) => check_buy_back(tx, req, ctx, prior_tx),
        Some(Metadata::IssuingRequest(req)) => check_issuing(req, ctx),
        Some(Metadata::UpdatingOracleBoard(_)) => Ok(Admission::OracleUpdate),
        Some(Metadata::MultiSigsRegistration(_)) => Ok(Admission::MultiSig),
        Some(Metadata::BuySellResponse(_))
        | Some(Metadata::BuyBackResponse(_))
        | Some(Metadata::Dividend(_))
        | Some(Metadata::Governance(_))
        | None => Ok(Admission::Plain),
    }
}

fn check_buy_from_treasury(
    req: &BuySellRequest,
    ctx: &mut BuildContext,
) -> Result<Admission, AdmissionError> {
    let bonds = ctx.params.selling_bonds;
    if !bonds.is_open_at(ctx.next_height) {
        return Err(AdmissionError::SellingWindowClosed {
            height: ctx.next_height,
            window_end: bonds.window_end(),
        });
    }

    let sold = ctx.acc.bonds_sold;
    if sold.saturating_add(req.amount) > bonds.bonds_to_sell {
        return Err(AdmissionError::BondCapExceeded {
            sold,
            requested: req.amount,
            cap: bonds.bonds_to_sell,
        });
    }

    ctx.acc.bonds_sold = sold + req.amount;
    ctx.acc.income_from_bonds = ctx
        .acc
        .income_from_bonds
        .saturating_add(req.amount.saturating_mul(req.buy_price));
    Ok(Admission::BuySell)
}

fn check_buy_back(
    tx: &Transaction,
    req: &BuyBackRequest,
    ctx: &mut BuildContext,
    prior_tx: &dyn Fn(&Hash) -> Option<Transaction>,
) -> Result<Admission, AdmissionError> {
    let token_data = tx.token_data().ok_or(AdmissionError::NotCustomToken)?;
    let first_vin = token_data
        .vins
        .first()
        .ok_or(AdmissionError::NoTokenInputs)?;

    let prior_id = first_vin.tx_custom_token_id;
    let prior = prior_tx(&prior_id)
        .ok_or_else(|| AdmissionError::PriorTxNotFound(hash_to_hex(&prior_id)))?;
    let response = match (prior.token_data(), prior.metadata()) {
        (Some(_), Some(Metadata::BuySellResponse(resp))) => resp.clone(),
        _ => return Err(AdmissionError::MissingSellResponse(hash_to_hex(&prior_id))),
    };

    let matures_at = response.start_selling_at.saturating_add(response.maturity);
    if matures_at > ctx.next_height {
        return Err(AdmissionError::NotMatured {
            height: ctx.next_height,
            matures_at,
        });
    }

    let committed = ctx.acc.buy_back_coins;
    let requested = response.buy_back_price.saturating_add(req.amount);
    let fund = ctx.params.salary_fund;
    if committed.saturating_add(requested) > fund {
        return Err(AdmissionError::TreasuryExhausted {
            committed,
            requested,
            fund,
        });
    }

    ctx.acc.buy_back_coins = committed + requested;
    Ok(Admission::BuyBack(BuyBackFromInfo {
        payment_address: req.payment_address.clone(),
        buy_back_price: response.buy_back_price,
        value: req.amount,
        requested_tx_id: tx.hash(),
    }))
}

fn check_issuing(req: &IssuingRequest, ctx: &mut BuildContext) -> Result<Admission, AdmissionError> {
    if req.asset_type != DCB_TOKEN_ID {
        return Ok(Admission::Issuing);
    }

    let requested = req.deposited_amount / ctx.params.dcb_token_price();
    let sold = ctx.acc.dcb_tokens_sold;
    let cap = ctx.params.dcb_tokens_for_sale;
    if sold.saturating_add(requested) > cap {
        return Err(AdmissionError::IssuanceCapExceeded {
            sold,
            requested,
            cap,
        });
    }

    ctx.acc.dcb_tokens_sold = sold + requested;
    Ok(Admission::Issuing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SellingBonds, StabilityParams};
    use proptest::prelude::*;
    use sc_01_block_model::{
        BuySellResponse, TokenTx, Tx, TxTokenData, TxTokenVin, GOV_TOKEN_ID,
    };
    use shared_types::PublicKey;

    fn key(last: u8) -> PublicKey {
        PublicKey::from_bytes(vec![0x42, last])
    }

    fn ctx(next_height: u64, params: StabilityParams) -> BuildContext {
        BuildContext::new(0, next_height, params)
    }

    fn no_prior(_: &Hash) -> Option<Transaction> {
        None
    }

    fn buy_sell(amount: u64, price: u64) -> Transaction {
        Transaction::Normal(Tx::new(key(0), 1, 0).with_metadata(Metadata::BuySellRequest(
            BuySellRequest {
                payment_address: key(0),
                token_id: GOV_TOKEN_ID,
                amount,
                buy_price: price,
            },
        )))
    }

    fn bond_params(bonds_to_sell: u64) -> StabilityParams {
        StabilityParams {
            selling_bonds: SellingBonds {
                start_selling_at: 10,
                selling_within: 100,
                bonds_to_sell,
            },
            ..StabilityParams::default()
        }
    }

    fn sale_response() -> Transaction {
        Transaction::CustomToken(TokenTx {
            tx: Tx::new(key(0), 0, 0).with_metadata(Metadata::BuySellResponse(BuySellResponse {
                requested_tx_id: [3u8; 32],
                start_selling_at: 100,
                maturity: 50,
                buy_back_price: 120,
                bond_id: vec![1],
            })),
            token_data: TxTokenData {
                property_id: [5u8; 32],
                property_name: "bond".into(),
                amount: 10,
                vins: vec![],
                vouts: vec![],
            },
        })
    }

    fn buy_back(prior: Hash, amount: u64) -> Transaction {
        Transaction::CustomToken(TokenTx {
            tx: Tx::new(key(0), 2, 0).with_metadata(Metadata::BuyBackRequest(BuyBackRequest {
                payment_address: key(9),
                amount,
            })),
            token_data: TxTokenData {
                property_id: [5u8; 32],
                property_name: "bond".into(),
                amount,
                vins: vec![TxTokenVin {
                    tx_custom_token_id: prior,
                    vout_index: 0,
                    payment_address: key(0),
                    signature: vec![],
                }],
                vouts: vec![],
            },
        })
    }

    fn issuing(asset: Hash, deposited: u64) -> Transaction {
        Transaction::Normal(Tx::new(key(0), 1, 0).with_metadata(Metadata::IssuingRequest(
            IssuingRequest {
                receiver_address: key(0),
                deposited_amount: deposited,
                asset_type: asset,
            },
        )))
    }

    #[test]
    fn test_buy_from_treasury_accumulates() {
        let mut c = ctx(20, bond_params(100));
        assert_eq!(
            check_admission(&buy_sell(30, 4), &mut c, &no_prior),
            Ok(Admission::BuySell)
        );
        assert_eq!(c.acc.bonds_sold, 30);
        assert_eq!(c.acc.income_from_bonds, 120);
    }

    #[test]
    fn test_buy_from_treasury_window_closed() {
        let mut c = ctx(111, bond_params(100));
        assert_eq!(
            check_admission(&buy_sell(1, 1), &mut c, &no_prior),
            Err(AdmissionError::SellingWindowClosed {
                height: 111,
                window_end: 110
            })
        );
        assert_eq!(c.acc.bonds_sold, 0);
    }

    #[test]
    fn test_buy_from_treasury_no_partial_admission() {
        let mut c = ctx(20, bond_params(50));
        assert!(check_admission(&buy_sell(40, 1), &mut c, &no_prior).is_ok());
        assert!(matches!(
            check_admission(&buy_sell(20, 1), &mut c, &no_prior),
            Err(AdmissionError::BondCapExceeded { sold: 40, requested: 20, cap: 50 })
        ));
        assert_eq!(c.acc.bonds_sold, 40);
        assert_eq!(c.acc.income_from_bonds, 40);
    }

    #[test]
    fn test_buy_back_before_maturity_rejected() {
        let prior = sale_response();
        let prior_id = prior.hash();
        let lookup = move |h: &Hash| (*h == prior_id).then(|| prior.clone());
        let params = StabilityParams {
            salary_fund: 10_000,
            ..StabilityParams::default()
        };

        let mut c = ctx(140, params);
        assert_eq!(
            check_admission(&buy_back(prior_id, 5), &mut c, &lookup),
            Err(AdmissionError::NotMatured {
                height: 140,
                matures_at: 150
            })
        );
        assert_eq!(c.acc.buy_back_coins, 0);
    }

    #[test]
    fn test_buy_back_at_maturity_admitted() {
        let prior = sale_response();
        let prior_id = prior.hash();
        let lookup = move |h: &Hash| (*h == prior_id).then(|| prior.clone());
        let params = StabilityParams {
            salary_fund: 10_000,
            ..StabilityParams::default()
        };

        let mut c = ctx(150, params);
        let request = buy_back(prior_id, 5);
        match check_admission(&request, &mut c, &lookup) {
            Ok(Admission::BuyBack(info)) => {
                assert_eq!(info.buy_back_price, 120);
                assert_eq!(info.value, 5);
                assert_eq!(info.payment_address, key(9));
                assert_eq!(info.requested_tx_id, request.hash());
                assert_eq!(info.payout(), 600);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(c.acc.buy_back_coins, 125);
    }

    #[test]
    fn test_buy_back_treasury_limit() {
        let prior = sale_response();
        let prior_id = prior.hash();
        let lookup = move |h: &Hash| (*h == prior_id).then(|| prior.clone());
        let params = StabilityParams {
            salary_fund: 200,
            ..StabilityParams::default()
        };

        let mut c = ctx(150, params);
        assert!(check_admission(&buy_back(prior_id, 5), &mut c, &lookup).is_ok());
        assert_eq!(
            check_admission(&buy_back(prior_id, 5), &mut c, &lookup),
            Err(AdmissionError::TreasuryExhausted {
                committed: 125,
                requested: 125,
                fund: 200
            })
        );
    }

    #[test]
    fn test_buy_back_unknown_prior() {
        let mut c = ctx(150, StabilityParams::default());
        assert!(matches!(
            check_admission(&buy_back([7u8; 32], 1), &mut c, &no_prior),
            Err(AdmissionError::PriorTxNotFound(_))
        ));
    }

    #[test]
    fn test_buy_back_requires_custom_token() {
        let tx = Transaction::Normal(Tx::new(key(0), 0, 0).with_metadata(
            Metadata::BuyBackRequest(BuyBackRequest {
                payment_address: key(0),
                amount: 1,
            }),
        ));
        let mut c = ctx(150, StabilityParams::default());
        assert_eq!(
            check_admission(&tx, &mut c, &no_prior),
            Err(AdmissionError::NotCustomToken)
        );
    }

    #[test]
    fn test_buy_back_prior_without_response() {
        let prior = buy_sell(1, 1);
        let prior_id = prior.hash();
        let lookup = move |h: &Hash| (*h == prior_id).then(|| prior.clone());
        let mut c = ctx(150, StabilityParams::default());
        assert!(matches!(
            check_admission(&buy_back(prior_id, 1), &mut c, &lookup),
            Err(AdmissionError::MissingSellResponse(_))
        ));
    }

    #[test]
    fn test_issuing_unrestricted_asset_always_admitted() {
        let mut c = ctx(1, StabilityParams::default());
        for _ in 0..3 {
            assert_eq!(
                check_admission(&issuing(GOV_TOKEN_ID, 1_000_000), &mut c, &no_prior),
                Ok(Admission::Issuing)
            );
        }
        assert_eq!(c.acc.dcb_tokens_sold, 0);
    }

    #[test]
    fn test_issuing_restricted_asset_capped() {
        let params = StabilityParams {
            dcb_tokens_for_sale: 100,
            oracle_dcb_price: 2,
            ..StabilityParams::default()
        };
        let mut c = ctx(1, params);
        assert!(check_admission(&issuing(DCB_TOKEN_ID, 150), &mut c, &no_prior).is_ok());
        assert_eq!(c.acc.dcb_tokens_sold, 75);
        assert_eq!(
            check_admission(&issuing(DCB_TOKEN_ID, 60), &mut c, &no_prior),
            Err(AdmissionError::IssuanceCapExceeded {
                sold: 75,
                requested: 30,
                cap: 100
            })
        );
        assert_eq!(c.acc.dcb_tokens_sold, 75);
    }

    #[test]
    fn test_issuing_zero_price_means_one() {
        let params = StabilityParams {
            dcb_tokens_for_sale: 10,
            ..StabilityParams::default()
        };
        let mut c = ctx(1, params);
        assert!(check_admission(&issuing(DCB_TOKEN_ID, 10), &mut c, &no_prior).is_ok());
        assert!(check_admission(&issuing(DCB_TOKEN_ID, 1), &mut c, &no_prior).is_err());
    }

    #[test]
    fn test_plain_transaction() {
        let tx = Transaction::Normal(Tx::new(key(0), 1, 0));
        let mut c = ctx(1, StabilityParams::default());
        assert_eq!(check_admission(&tx, &mut c, &no_prior), Ok(Admission::Plain));
    }

    proptest! {
        #[test]
        fn prop_bonds_sold_never_exceeds_cap(
            cap in 0u64..500,
            amounts in proptest::collection::vec(0u64..200, 0..40),
        ) {
            let mut c = ctx(20, bond_params(cap));
            let mut expected = 0u64;
            for amount in amounts {
                let before = c.acc.bonds_sold;
                match check_admission(&buy_sell(amount, 1), &mut c, &no_prior) {
                    Ok(_) => {
                        expected += amount;
                        prop_assert_eq!(c.acc.bonds_sold, before + amount);
                    }
                    Err(_) => prop_assert_eq!(c.acc.bonds_sold, before),
                }
                prop_assert!(c.acc.bonds_sold <= cap);
            }
            prop_assert_eq!(c.acc.bonds_sold, expected);
        }
    }
}
