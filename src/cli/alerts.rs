//! `reco alerts get`: run a detection pass, store it, and fetch one alert
//! plus its resolved guide.

use colored::Colorize;

use crate::cli::reconcile;
use crate::error::{ReconError, Result};
use crate::guides::AlertStore;

pub fn get(data_dir: &std::path::Path, id: u64, holidays: &[String]) -> Result<()> {
    let alerts = reconcile::run(data_dir, holidays)?;
    let mut store = AlertStore::new();
    store.record_pass(alerts);

    match store.get(id) {
        Some((alert, Some(guide))) => {
            println!("{}", format!("Alert #{id}: {}", alert.kind.code()).bold());
            println!("  severity: {:?}", alert.severity);
            println!("  ref: {}", alert.reference);
            println!("  document: {}", alert.document_id);
            println!("  {}", alert.description);
            println!();
            println!("{}", "Guide".bold());
            println!("  {}: {}", guide.title, guide.action);
            println!("  suggested account: {}", guide.suggested_account);
            println!("  {}", guide.counter_entry_hint);
            Ok(())
        }
        Some((alert, None)) => {
            println!("Alert #{id}: {} (no guide available)", alert.kind.code());
            Ok(())
        }
        None => Err(ReconError::Other(format!("no alert with id {id} in this detection pass"))),
    }
}
