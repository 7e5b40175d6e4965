//! `reco analyze`: print the ledger characteristics snapshot for a GL
//! document, as a formatted report or raw JSON.

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::analytics::{compute_snapshot, empty_snapshot};
use crate::entry::normalize_entries;
use crate::error::Result;
use crate::fmt::money;
use crate::models::LedgerSnapshot;
use crate::store::{DocumentStore, FsDocumentStore};

pub fn run(data_dir: &std::path::Path, document_id: Option<String>, as_json: bool) -> Result<()> {
    let store = FsDocumentStore::new(data_dir);

    let (document_id, document) = match document_id {
        Some(id) => (id.clone(), store.get_document(&id)?),
        None => store.get_latest("grandlivre")?,
    };

    let entries = match document.get("ecritures_comptables").and_then(|v| v.as_array()) {
        Some(records) => normalize_entries(records),
        None => {
            let snapshot = empty_snapshot(Some("document has no ecritures_comptables array".to_string()));
            return print_result(&snapshot, as_json);
        }
    };

    let config = crate::config::load_or_default();
    let snapshot = compute_snapshot(&entries, Some(document_id), None, &config);
    print_result(&snapshot, as_json)
}

fn print_result(snapshot: &LedgerSnapshot, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }

    if let Some(error) = &snapshot.error {
        println!("{}", format!("Error: {error}").red());
        return Ok(());
    }

    let mut totals = Table::new();
    totals.set_header(vec!["Metric", "Value"]);
    totals.add_row(vec![Cell::new("Entries"), Cell::new(snapshot.entry_count)]);
    totals.add_row(vec![Cell::new("Total debit"), Cell::new(money(snapshot.total_debit))]);
    totals.add_row(vec![Cell::new("Total credit"), Cell::new(money(snapshot.total_credit))]);
    totals.add_row(vec![Cell::new("Balance".bold()), Cell::new(money(snapshot.balance).bold().to_string())]);
    println!("{totals}");

    let mut by_type = Table::new();
    by_type.set_header(vec!["Account type", "Entries", "Debit", "Credit", "Balance"]);
    for (account_type, balance) in &snapshot.balances_by_type {
        by_type.add_row(vec![
            Cell::new(account_type),
            Cell::new(balance.entry_count),
            Cell::new(money(balance.total_debit)),
            Cell::new(money(balance.total_credit)),
            Cell::new(money(balance.balance)),
        ]);
    }
    println!("{by_type}");

    if !snapshot.anomalies.is_empty() {
        let mut anomalies = Table::new();
        anomalies.set_header(vec!["Kind", "Account", "Date", "Description"]);
        for anomaly in &snapshot.anomalies {
            anomalies.add_row(vec![
                Cell::new(anomaly.kind.as_str().yellow().to_string()),
                Cell::new(anomaly.account.clone().unwrap_or_default()),
                Cell::new(anomaly.date.clone().unwrap_or_default()),
                Cell::new(&anomaly.description),
            ]);
        }
        println!("{anomalies}");
    }

    Ok(())
}
