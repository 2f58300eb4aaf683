use crate::models::chart::{BarDirection, PnlBar};
use crate::models::metrics::SymbolMetric;

/// Generates chart-ready data sets from computed metrics.
///
/// The core computes all the numbers; the frontend only renders them.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// One bar per symbol, in the order of `metrics`.
    /// Non-negative P&L is drawn as a gain, anything below zero as a loss.
    pub fn pnl_bars(&self, metrics: &[SymbolMetric]) -> Vec<PnlBar> {
        metrics
            .iter()
            .map(|m| PnlBar {
                symbol: m.symbol.clone(),
                value: m.profit_loss,
                direction: BarDirection::from_value(m.profit_loss),
            })
            .collect()
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}
