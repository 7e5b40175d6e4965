//! Entry normalizer (C2): collapses heterogeneous field aliases from a raw
//! GL/RL record into the canonical [`LedgerEntry`] / [`BankOperation`] shape.

use serde_json::Value;

use crate::models::{BankOperation, LedgerEntry};
use crate::normalize::{parse_amount, parse_date};

const ACCOUNT_ALIASES: &[&str] = &["n° compte", "numero_compte", "compte", "N° Compte"];
pub(crate) const LABEL_ALIASES: &[&str] = &["libellé", "libelle", "description", "Libellé"];
const DATE_ALIASES: &[&str] = &["date", "Date", "DATE"];
const DEBIT_ALIASES: &[&str] = &["débit", "debit", "DÉBIT"];
const CREDIT_ALIASES: &[&str] = &["crédit", "credit", "CRÉDIT"];

fn probe<'a>(record: &'a serde_json::Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| record.get(*key))
}

fn probe_str(record: &serde_json::Map<String, Value>, aliases: &[&str]) -> Option<String> {
    probe(record, aliases).and_then(|v| v.as_str()).map(|s| s.trim().to_string())
}

/// Normalize one raw GL record. Returns `None` when `account` is missing or
/// blank (the entry is discarded, per the data model invariant).
pub fn normalize_entry(record: &Value) -> Option<LedgerEntry> {
    let record = record.as_object()?;

    let account = probe_str(record, ACCOUNT_ALIASES).filter(|s| !s.is_empty())?;
    let label = probe_str(record, LABEL_ALIASES).unwrap_or_default();
    let date = probe(record, DATE_ALIASES)
        .and_then(|v| v.as_str())
        .and_then(parse_date)
        .unwrap_or_default();
    let debit = probe(record, DEBIT_ALIASES).map(parse_amount).unwrap_or(0.0);
    let credit = probe(record, CREDIT_ALIASES).map(parse_amount).unwrap_or(0.0);

    Some(LedgerEntry {
        account,
        label,
        date,
        debit,
        credit,
    })
}

/// Normalize the full `ecritures_comptables` array of a GL document,
/// dropping any record missing `account`.
pub fn normalize_entries(records: &[Value]) -> Vec<LedgerEntry> {
    records.iter().filter_map(normalize_entry).collect()
}

/// Normalize one raw RL record (`date`, `nature`, `montant`, `type`).
pub fn normalize_operation(record: &Value) -> Option<BankOperation> {
    let record = record.as_object()?;
    let date = probe(record, DATE_ALIASES)
        .and_then(|v| v.as_str())
        .and_then(parse_date)
        .unwrap_or_default();
    let nature = probe_str(record, &["nature", "Nature"]).unwrap_or_default();
    let montant = probe(record, &["montant", "Montant"]).map(parse_amount).unwrap_or(0.0);
    let r#type = probe_str(record, &["type", "Type"]).unwrap_or_default();
    Some(BankOperation {
        date,
        nature,
        montant,
        r#type,
    })
}

pub fn normalize_operations(records: &[Value]) -> Vec<BankOperation> {
    records.iter().filter_map(normalize_operation).collect()
}
