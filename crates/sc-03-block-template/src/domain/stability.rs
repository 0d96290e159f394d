//! Stability parameters read from the chain for one template build.

use serde::{Deserialize, Serialize};

/// Government bond sale window and supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SellingBonds {
    /// Height the sale opens.
    pub start_selling_at: u64,
    /// Blocks the sale stays open after `start_selling_at`.
    pub selling_within: u64,
    /// Bonds available for the whole sale.
    pub bonds_to_sell: u64,
}

impl SellingBonds {
    /// Last height at which bonds can still be bought.
    pub fn window_end(&self) -> u64 {
        self.start_selling_at.saturating_add(self.selling_within)
    }

    /// Whether a block at `height` may still sell bonds.
    pub fn is_open_at(&self, height: u64) -> bool {
        height <= self.window_end()
    }
}

/// Treasury and oracle state the admission checks run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StabilityParams {
    /// Bond sale parameters.
    pub selling_bonds: SellingBonds,
    /// Stablecoin-bank tokens that may be issued against deposits.
    pub dcb_tokens_for_sale: u64,
    /// Oracle price of one stablecoin-bank token; 0 means unset.
    pub oracle_dcb_price: u64,
    /// Treasury balance after the previous block.
    pub salary_fund: u64,
}

impl StabilityParams {
    /// Oracle token price, 1 when the oracle has not published one.
    pub fn dcb_token_price(&self) -> u64 {
        if self.oracle_dcb_price == 0 {
            1
        } else {
            self.oracle_dcb_price
        }
    }
}
