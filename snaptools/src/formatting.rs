use std::fmt::Write;

use anyhow::Result;
use prettytable::{
    format::{LinePosition, LineSeparator, TableFormat},
    row,
    Table,
};
use snap_payment_engine::{status_objects::StatusSnapshot, traits::ReconciliationReport};

fn markdown_format() -> TableFormat {
    prettytable::format::FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn markdown_style(table: &mut Table) {
    table.set_format(markdown_format());
}

pub fn format_status_snapshot(snapshot: &StatusSnapshot) -> Result<String> {
    let mut f = String::new();
    writeln!(f, "Order: {}", snapshot.order_id.as_str())?;
    writeln!(f, "Payment status: {}", snapshot.payment_status)?;
    match &snapshot.transaction_status {
        Some(status) => writeln!(f, "Gateway status: {status}")?,
        None => writeln!(f, "Gateway status: (no notification received yet)")?,
    }
    if let Some(method) = &snapshot.payment_method {
        writeln!(f, "Payment method: {method}")?;
    }
    if let Some(amount) = &snapshot.amount {
        writeln!(f, "Amount: {amount}")?;
    }
    if let Some(url) = &snapshot.invoice_url {
        writeln!(f, "Invoice: {url}")?;
    }
    if let Some(updated) = &snapshot.updated_at {
        writeln!(f, "Last update: {updated}")?;
    }
    Ok(f)
}

pub fn format_reconciliation_report(report: &ReconciliationReport) -> Result<String> {
    let mut f = String::new();
    writeln!(
        f,
        "Reconciliation pass complete. {} pending, {} updated, {} unchanged, {} failed.",
        report.total, report.updated, report.unchanged, report.failed
    )?;
    if !report.updated_transactions.is_empty() {
        let mut table = Table::new();
        markdown_style(&mut table);
        table.set_titles(row!["Order", "Old status", "New status", "Gateway status"]);
        for t in &report.updated_transactions {
            table.add_row(row![t.order_id.as_str(), t.old_status, t.new_status, t.gateway_status]);
        }
        writeln!(f, "\n{table}")?;
    }
    if !report.failed_transactions.is_empty() {
        let mut table = Table::new();
        markdown_style(&mut table);
        table.set_titles(row!["Order", "Error"]);
        for t in &report.failed_transactions {
            table.add_row(row![t.order_id.as_str(), t.error]);
        }
        writeln!(f, "\n{table}")?;
    }
    Ok(f)
}
