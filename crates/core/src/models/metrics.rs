use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::chart::PnlBar;
use super::filter::FilterCriteria;

/// Realized P&L and volume breakdown of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetric {
    pub symbol: String,

    /// `total_buys + total_sells`
    pub total_operations: usize,
    pub total_buys: usize,
    pub total_sells: usize,

    /// Sum of `size` over buys
    pub total_usdt_spent: f64,

    /// Sum of `size / execution_price` over buys
    pub total_base_bought: f64,

    /// Sum of `size * execution_price` over sells
    pub total_usdt_received: f64,

    /// Sum of `size` over sells
    pub total_base_sold: f64,

    /// Base quantity both bought and sold: `min(bought, sold)`
    pub realized_volume: f64,

    /// Base quantity still open: `|bought - sold|`
    pub unrealized_volume: f64,

    /// Realized P&L in quote currency, over `realized_volume` only
    pub profit_loss: f64,

    /// `profit_loss / cost_of_sold * 100`
    pub profit_loss_percentage: f64,

    /// Simple (non-compounding) annualization of `profit_loss_percentage`
    /// over the span between the first and last operation. This is an
    /// approximation kept for parity with the backend's numbers.
    pub apy: f64,

    pub first_operation_date: Option<DateTime<Utc>>,
    pub last_operation_date: Option<DateTime<Utc>>,
}

impl SymbolMetric {
    pub fn is_profitable(&self) -> bool {
        self.profit_loss >= 0.0
    }
}

/// Portfolio-level totals over a set of symbol metrics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioTotals {
    pub total_profit_loss: f64,
    pub total_invested: f64,
    /// `total_profit_loss / total_invested * 100`, or 0 when nothing was invested
    pub total_return_percentage: f64,
}

/// Everything the P&L page renders for one filter selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PnlReport {
    pub criteria: FilterCriteria,

    /// Operations that passed the filter
    pub matched_operations: usize,

    /// Matched operations left out of the sums because of missing or invalid values
    pub skipped_operations: usize,

    /// Sorted by `profit_loss`, best first
    pub metrics: Vec<SymbolMetric>,

    pub totals: PortfolioTotals,

    /// One bar per symbol, same order as `metrics`
    pub bars: Vec<PnlBar>,
}

impl PnlReport {
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
