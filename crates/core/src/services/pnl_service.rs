use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::models::filter::FilterCriteria;
use crate::models::metrics::{PnlReport, PortfolioTotals, SymbolMetric};
use crate::models::operation::{Contribution, Operation, Side};
use crate::services::chart_service::ChartService;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
const DAYS_PER_YEAR: f64 = 365.0;

/// Turns a flat list of trade fills into per-symbol realized P&L.
///
/// Pure business logic: no I/O, no state between calls. The pipeline is
/// `filter → group by symbol → reduce → sort → totals`.
pub struct PnlService {
    chart_service: ChartService,
}

impl PnlService {
    pub fn new() -> Self {
        Self {
            chart_service: ChartService::new(),
        }
    }

    /// Keep the operations matching every active criterion.
    ///
    /// Date bounds compare calendar days in `criteria.timezone` and are
    /// inclusive on both ends. An operation without a date only survives
    /// when no date bound is set.
    pub fn filter_operations(
        &self,
        operations: &[Operation],
        criteria: &FilterCriteria,
    ) -> Vec<Operation> {
        operations
            .iter()
            .filter(|op| Self::matches(op, criteria))
            .cloned()
            .collect()
    }

    fn matches(op: &Operation, criteria: &FilterCriteria) -> bool {
        if !criteria.symbol.matches(&op.symbol) {
            return false;
        }
        if !criteria.instance_id.matches(&op.instance_id) {
            return false;
        }
        if !criteria.has_date_range() {
            return true;
        }
        match op.date {
            Some(date) => criteria.day_in_range(criteria.calendar_day(date)),
            None => false,
        }
    }

    /// Compute one `SymbolMetric` per symbol, best performer first.
    ///
    /// Malformed operations (see `Operation::contribution`) are counted but
    /// add nothing to the sums. Equal `profit_loss` values are ordered by
    /// symbol so the output never depends on input order.
    pub fn aggregate_by_symbol(&self, operations: &[Operation]) -> Vec<SymbolMetric> {
        let mut groups: BTreeMap<&str, SymbolGroup> = BTreeMap::new();

        for op in operations {
            let group = groups.entry(op.symbol.as_str()).or_default();
            group.push(op);
        }

        let mut metrics: Vec<SymbolMetric> = groups
            .into_iter()
            .map(|(symbol, group)| group.into_metric(symbol))
            .collect();

        metrics.sort_by(|a, b| {
            b.profit_loss
                .total_cmp(&a.profit_loss)
                .then_with(|| a.symbol.cmp(&b.symbol))
        });

        metrics
    }

    /// Sum P&L and invested capital across symbols.
    pub fn compute_portfolio_totals(&self, metrics: &[SymbolMetric]) -> PortfolioTotals {
        let total_profit_loss: f64 = metrics.iter().map(|m| m.profit_loss).sum();
        let total_invested: f64 = metrics.iter().map(|m| m.total_usdt_spent).sum();
        let total_return_percentage = if total_invested > 0.0 {
            total_profit_loss / total_invested * 100.0
        } else {
            0.0
        };

        PortfolioTotals {
            total_profit_loss,
            total_invested,
            total_return_percentage,
        }
    }

    /// Sorted, de-duplicated symbols (the symbol dropdown).
    pub fn distinct_symbols(&self, operations: &[Operation]) -> Vec<String> {
        operations
            .iter()
            .map(|op| op.symbol.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Run the whole pipeline for one filter selection.
    pub fn build_report(&self, operations: &[Operation], criteria: &FilterCriteria) -> PnlReport {
        let filtered = self.filter_operations(operations, criteria);
        let skipped_operations = filtered
            .iter()
            .filter(|op| op.contribution().is_none())
            .count();
        let metrics = self.aggregate_by_symbol(&filtered);
        let totals = self.compute_portfolio_totals(&metrics);
        let bars = self.chart_service.pnl_bars(&metrics);

        debug!(
            total = operations.len(),
            matched = filtered.len(),
            skipped = skipped_operations,
            symbols = metrics.len(),
            "built P&L report"
        );

        PnlReport {
            criteria: criteria.clone(),
            matched_operations: filtered.len(),
            skipped_operations,
            metrics,
            totals,
            bars,
        }
    }
}

impl Default for PnlService {
    fn default() -> Self {
        Self::new()
    }
}

/// Running state of one symbol while aggregating.
#[derive(Default)]
struct SymbolGroup {
    total_buys: usize,
    total_sells: usize,
    buys: Vec<Contribution>,
    sells: Vec<Contribution>,
    first_date: Option<DateTime<Utc>>,
    last_date: Option<DateTime<Utc>>,
}

impl SymbolGroup {
    fn push(&mut self, op: &Operation) {
        match op.side {
            Side::Buy => self.total_buys += 1,
            Side::Sell => self.total_sells += 1,
        }

        if let Some(date) = op.date {
            self.first_date = Some(self.first_date.map_or(date, |d| d.min(date)));
            self.last_date = Some(self.last_date.map_or(date, |d| d.max(date)));
        }

        match op.contribution() {
            Some(c) => match op.side {
                Side::Buy => self.buys.push(c),
                Side::Sell => self.sells.push(c),
            },
            None => debug!(
                symbol = %op.symbol,
                side = %op.side,
                instance_id = op.instance_id,
                "skipping malformed operation"
            ),
        }
    }

    fn into_metric(mut self, symbol: &str) -> SymbolMetric {
        // Summing in a canonical order makes the float results independent
        // of the order operations arrived in.
        self.buys.sort_by(canonical_order);
        self.sells.sort_by(canonical_order);

        let total_usdt_spent: f64 = self.buys.iter().map(|c| c.quote).sum();
        let total_base_bought: f64 = self.buys.iter().map(|c| c.base).sum();
        let total_usdt_received: f64 = self.sells.iter().map(|c| c.quote).sum();
        let total_base_sold: f64 = self.sells.iter().map(|c| c.base).sum();

        let realized_volume = total_base_bought.min(total_base_sold);
        let unrealized_volume = (total_base_bought - total_base_sold).abs();

        let (profit_loss, profit_loss_percentage) =
            if total_base_bought > 0.0 && total_base_sold > 0.0 && realized_volume > 0.0 {
                let avg_cost_per_base = total_usdt_spent / total_base_bought;
                let avg_revenue_per_base = total_usdt_received / total_base_sold;
                let cost_of_sold = avg_cost_per_base * realized_volume;
                let revenue_from_sold = avg_revenue_per_base * realized_volume;
                let profit_loss = revenue_from_sold - cost_of_sold;
                let percentage = if cost_of_sold > 0.0 {
                    profit_loss / cost_of_sold * 100.0
                } else {
                    0.0
                };
                (profit_loss, percentage)
            } else {
                (0.0, 0.0)
            };

        let apy = annualize(profit_loss_percentage, self.first_date, self.last_date);

        SymbolMetric {
            symbol: symbol.to_string(),
            total_operations: self.total_buys + self.total_sells,
            total_buys: self.total_buys,
            total_sells: self.total_sells,
            total_usdt_spent,
            total_base_bought,
            total_usdt_received,
            total_base_sold,
            realized_volume,
            unrealized_volume,
            profit_loss,
            profit_loss_percentage,
            apy,
            first_operation_date: self.first_date,
            last_operation_date: self.last_date,
        }
    }
}

fn canonical_order(a: &Contribution, b: &Contribution) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.quote.total_cmp(&b.quote))
        .then_with(|| a.base.total_cmp(&b.base))
}

/// Simple annualization: `pct / days * 365`. Zero for a zero return or
/// when the first and last operation share the same instant.
fn annualize(
    percentage: f64,
    first: Option<DateTime<Utc>>,
    last: Option<DateTime<Utc>>,
) -> f64 {
    if percentage == 0.0 {
        return 0.0;
    }
    match (first, last) {
        (Some(first), Some(last)) if last > first => {
            let days = (last - first).num_milliseconds() as f64 / MILLIS_PER_DAY;
            percentage / days * DAYS_PER_YEAR
        }
        _ => 0.0,
    }
}
