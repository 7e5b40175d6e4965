//! `reco reconcile`: run the anomaly detector over the latest GL/RL/source
//! documents and print the resulting alerts.

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::anomalies::detect_anomalies;
use crate::entry::{normalize_entries, normalize_operations};
use crate::error::Result;
use crate::models::{Alert, Severity};
use crate::store::{DocumentStore, FsDocumentStore};

pub fn run(data_dir: &std::path::Path, holidays: &[String]) -> Result<Vec<Alert>> {
    let store = FsDocumentStore::new(data_dir);
    let config = crate::config::load_or_default();

    let (gl_id, gl_doc) = store.get_latest("grandlivre")?;
    let (rl_id, rl_doc) = store.get_latest("releve")?;
    let entries = gl_doc.get("ecritures_comptables").and_then(|v| v.as_array()).map(|v| normalize_entries(v)).unwrap_or_default();
    let operations = rl_doc.get("operations").and_then(|v| v.as_array()).map(|v| normalize_operations(v)).unwrap_or_default();
    let documents = store.list_source_documents()?;

    let alerts = detect_anomalies(&gl_id, &entries, &rl_id, &operations, &documents, holidays, &config);
    print_alerts(&alerts);
    Ok(alerts)
}

fn print_alerts(alerts: &[Alert]) {
    if alerts.is_empty() {
        println!("{}", "No anomalies detected.".green());
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Kind", "Severity", "Ref", "Document", "Description"]);
    for alert in alerts {
        let severity_cell = match alert.severity {
            Severity::Critical => Cell::new("critical").add_attribute(comfy_table::Attribute::Bold),
            Severity::High => Cell::new("high"),
            Severity::Medium => Cell::new("medium"),
            Severity::Low => Cell::new("low"),
        };
        table.add_row(vec![
            Cell::new(alert.id),
            Cell::new(alert.kind.code()),
            severity_cell,
            Cell::new(&alert.reference),
            Cell::new(&alert.document_id),
            Cell::new(&alert.description),
        ]);
    }
    println!("{table}");
    println!("{}", format!("{} alert(s).", alerts.len()).yellow());
}
