use anyhow::Result;
use chrono::{DateTime, Utc};

use trading_dashboard_core::models::instance::Instance;
use trading_dashboard_core::models::metrics::PnlReport;
use trading_dashboard_core::models::page::Page;

pub fn print_report(report: &PnlReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    if report.is_empty() {
        println!("No operations match the selected filters.");
        return Ok(());
    }

    println!(
        "{:<12} {:>5} {:>5} {:>5} {:>14} {:>14} {:>14} {:>9} {:>10}  {:<10} {:<10}",
        "SYMBOL", "OPS", "BUYS", "SELLS", "REALIZED", "OPEN", "P&L", "P&L %", "APY %", "FIRST", "LAST"
    );
    for m in &report.metrics {
        println!(
            "{:<12} {:>5} {:>5} {:>5} {:>14.8} {:>14.8} {:>14.2} {:>9.2} {:>10.2}  {:<10} {:<10}",
            m.symbol,
            m.total_operations,
            m.total_buys,
            m.total_sells,
            m.realized_volume,
            m.unrealized_volume,
            m.profit_loss,
            m.profit_loss_percentage,
            m.apy,
            day(m.first_operation_date),
            day(m.last_operation_date),
        );
    }

    println!();
    println!("Total P&L:      {:.2}", report.totals.total_profit_loss);
    println!("Total invested: {:.2}", report.totals.total_invested);
    println!("Total return:   {:.2}%", report.totals.total_return_percentage);

    if report.skipped_operations > 0 {
        println!(
            "({} of {} operations skipped: missing or invalid size, price or date)",
            report.skipped_operations, report.matched_operations
        );
    }
    Ok(())
}

pub fn print_instances(page: &Page<Instance>) {
    if page.items.is_empty() {
        println!("No instances found.");
    } else {
        println!("{:>6}  {:<30} {:<12} {:<8}", "ID", "NAME", "SYMBOL", "STATUS");
        for i in &page.items {
            println!(
                "{:>6}  {:<30} {:<12} {:<8}",
                i.id,
                i.name,
                i.symbol.as_deref().unwrap_or("-"),
                i.status.to_string()
            );
        }
    }
    println!(
        "Page {}/{} ({} instances)",
        page.page, page.total_pages, page.total_items
    );
}

fn day(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}
