//! Anomaly detector (C6): the eight reconciliation rules, applied over the
//! reference index built from one detection pass's GL/RL/source documents.

use chrono::{NaiveDate, Weekday};

use crate::config::AnomalyConfig;
use crate::models::{Alert, AlertKind, BankOperation, LedgerEntry, Severity, Source, SourceDocument};
use crate::reference_index::ReferenceIndex;

struct AlertBuilder {
    next_id: u64,
    alerts: Vec<Alert>,
}

impl AlertBuilder {
    fn new() -> Self {
        AlertBuilder { next_id: 1, alerts: Vec::new() }
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        kind: AlertKind,
        severity: Severity,
        reference: &str,
        document_id: &str,
        source: Source,
        description: String,
        date: Option<String>,
        montant: Option<f64>,
        montant_gl: Option<f64>,
        montant_releve: Option<f64>,
        delta: Option<f64>,
    ) {
        let alert = Alert {
            id: self.next_id,
            kind,
            severity,
            reference: reference.to_string(),
            document_id: document_id.to_string(),
            source,
            date,
            montant,
            montant_gl,
            montant_releve,
            delta,
            nom_client: None,
            type_facture: None,
            r#type: None,
            description,
            title: None,
        };
        self.next_id += 1;
        self.alerts.push(alert);
    }
}

fn severity_from_delta(delta: f64, config: &AnomalyConfig) -> Severity {
    let magnitude = delta.abs();
    if magnitude >= config.severity_critical_threshold {
        Severity::Critical
    } else if magnitude >= config.severity_high_threshold {
        Severity::High
    } else if magnitude >= config.severity_medium_threshold {
        Severity::Medium
    } else {
        Severity::Low
    }
}

fn is_non_business_day(date: &str, holidays: &[String]) -> bool {
    if holidays.iter().any(|h| h == date) {
        return true;
    }
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => matches!(d.weekday(), Weekday::Sat | Weekday::Sun),
        Err(_) => false,
    }
}

fn carrier(doc: &SourceDocument, field: &str) -> Option<String> {
    doc.get(field).and_then(|v| v.as_str()).map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Run the full rule set over one detection pass. `documents` pairs each
/// source document with the id it would be edited under; `holidays` is the
/// caller-supplied ISO-date calendar for `JOUR_NON_OUVRABLE`.
pub fn detect_anomalies(
    gl_document_id: &str,
    entries: &[LedgerEntry],
    rl_document_id: &str,
    operations: &[BankOperation],
    documents: &[(String, SourceDocument)],
    holidays: &[String],
    config: &AnomalyConfig,
) -> Vec<Alert> {
    let plain_docs: Vec<SourceDocument> = documents.iter().map(|(_, doc)| doc.clone()).collect();
    let index = ReferenceIndex::build(entries, operations, &plain_docs);
    let mut builder = AlertBuilder::new();

    for (document_id, doc) in documents {
        let invoice_ref = carrier(doc, "Numéro Facture");
        let cheque_ref = carrier(doc, "Numéro de Chèque");

        if invoice_ref.is_none() && cheque_ref.is_none() {
            builder.push(
                AlertKind::NumeroManquant,
                Severity::Medium,
                "",
                document_id,
                Source::Gl,
                "Source document has no invoice or cheque number".to_string(),
                None,
                None,
                None,
                None,
                None,
            );
            continue;
        }

        if let Some(reference) = invoice_ref {
            detect_invoice_anomalies(&mut builder, &index, &reference, gl_document_id, config);
        }
        if let Some(reference) = cheque_ref {
            detect_cheque_anomalies(&mut builder, &index, &reference, gl_document_id, config);
        }
    }

    for entry in entries {
        if !entry.date.is_empty() && is_non_business_day(&entry.date, holidays) {
            builder.push(
                AlertKind::JourNonOuvrable,
                Severity::Medium,
                "",
                gl_document_id,
                Source::Gl,
                format!("Entry on account {} dated {} falls on a non-business day", entry.account, entry.date),
                Some(entry.date.clone()),
                Some(entry.net()),
                None,
                None,
                None,
            );
        }
    }
    for operation in operations {
        if !operation.date.is_empty() && is_non_business_day(&operation.date, holidays) {
            builder.push(
                AlertKind::JourNonOuvrable,
                Severity::Medium,
                "",
                rl_document_id,
                Source::Rl,
                format!("Operation {} dated {} falls on a non-business day", operation.nature, operation.date),
                Some(operation.date.clone()),
                Some(operation.montant),
                None,
                None,
                None,
            );
        }
    }

    builder.alerts
}

fn detect_invoice_anomalies(
    builder: &mut AlertBuilder,
    index: &ReferenceIndex,
    reference: &str,
    gl_document_id: &str,
    config: &AnomalyConfig,
) {
    let gl_matches = index.gl_by_ref.get(reference);
    let rl_matches = index.rl_by_ref.get(reference);

    if let Some(gl) = gl_matches {
        let on_bank_account = gl.iter().any(|e| e.account.starts_with("512"));
        let on_origin_account =
            gl.iter().any(|e| e.account.starts_with("401") || e.account.starts_with("411") || e.account.starts_with('6'));
        if config.alert_on_missing_transactions && on_origin_account && !on_bank_account {
            builder.push(
                AlertKind::FactureNonRapprocheeGl,
                Severity::High,
                reference,
                gl_document_id,
                Source::Gl,
                format!("Invoice {reference} is posted in the GL but never settled against a bank account"),
                None,
                None,
                None,
                None,
                None,
            );
        }
    }

    if let (Some(gl), Some(rl)) = (gl_matches, rl_matches) {
        let gl_amount: f64 = gl.iter().map(|e| e.net()).sum();
        let rl_amount: f64 = rl.iter().map(|o| o.montant).sum();
        let delta = gl_amount - rl_amount;
        let tolerance = config.amount_tolerance(gl_amount.abs().max(rl_amount.abs()));
        if delta.abs() > tolerance {
            builder.push(
                AlertKind::EcartMontant,
                severity_from_delta(delta, config),
                reference,
                gl_document_id,
                Source::Gl,
                format!("Invoice {reference}: GL amount {gl_amount:.2} differs from bank amount {rl_amount:.2}"),
                None,
                None,
                Some(gl_amount),
                Some(rl_amount),
                Some(delta.abs()),
            );
        }
    }
}

fn detect_cheque_anomalies(
    builder: &mut AlertBuilder,
    index: &ReferenceIndex,
    reference: &str,
    gl_document_id: &str,
    config: &AnomalyConfig,
) {
    let gl_matches = index.gl_by_ref.get(reference);
    let rl_matches = index.rl_by_ref.get(reference);

    let has_gl = gl_matches.map(|v| !v.is_empty()).unwrap_or(false);
    let has_rl = rl_matches.map(|v| !v.is_empty()).unwrap_or(false);
    let on_origin_account = gl_matches.map(|v| v.iter().any(|e| !e.account.starts_with("512"))).unwrap_or(false);
    let on_bank_account = gl_matches.map(|v| v.iter().any(|e| e.account.starts_with("512"))).unwrap_or(false);

    if config.alert_on_missing_transactions && has_rl && !has_gl {
        builder.push(
            AlertKind::ChequeNonComptabiliseGl,
            Severity::High,
            reference,
            gl_document_id,
            Source::Gl,
            format!("Cheque {reference} cleared the bank but was never posted to the GL"),
            None,
            None,
            None,
            None,
            None,
        );
    }

    if config.alert_on_missing_transactions && on_origin_account && !has_rl && !on_bank_account {
        builder.push(
            AlertKind::ChequeEmisNonEncaisseGl,
            Severity::High,
            reference,
            gl_document_id,
            Source::Gl,
            format!("Cheque {reference} was issued in the GL but has not cleared the bank"),
            None,
            None,
            None,
            None,
            None,
        );
    }

    if config.alert_on_missing_transactions && has_rl && !on_origin_account {
        builder.push(
            AlertKind::ChequeEncaisseNonEmisGl,
            Severity::High,
            reference,
            gl_document_id,
            Source::Gl,
            format!("Cheque {reference} cleared the bank but has no matching issuance entry in the GL"),
            None,
            None,
            None,
            None,
            None,
        );
    }

    if let (Some(gl), Some(rl)) = (gl_matches, rl_matches) {
        let gl_amount: f64 = gl.iter().map(|e| e.net()).sum();
        let rl_amount: f64 = rl.iter().map(|o| o.montant).sum();
        let delta = gl_amount - rl_amount;
        let tolerance = config.amount_tolerance(gl_amount.abs().max(rl_amount.abs()));
        if delta.abs() > tolerance {
            builder.push(
                AlertKind::ChequeIncoherentGl,
                severity_from_delta(delta, config),
                reference,
                gl_document_id,
                Source::Gl,
                format!("Cheque {reference}: GL amount {gl_amount:.2} differs from bank amount {rl_amount:.2}"),
                None,
                None,
                Some(gl_amount),
                Some(rl_amount),
                Some(delta.abs()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(account: &str, label: &str, debit: f64, credit: f64) -> LedgerEntry {
        LedgerEntry { account: account.to_string(), label: label.to_string(), date: String::new(), debit, credit }
    }

    fn operation(nature: &str, montant: f64) -> BankOperation {
        BankOperation { date: String::new(), nature: nature.to_string(), montant, r#type: String::new() }
    }

    #[test]
    fn amount_discrepancy_produces_ecart_montant_with_exact_delta() {
        let entries = vec![entry("411000", "Facture FAC42", 100.0, 0.0)];
        let operations = vec![operation("VIR FAC42", 102.0)];
        let doc: SourceDocument = json!({"Numéro Facture": "FAC42"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &entries, "rl-1", &operations, &[("inv-1".to_string(), doc)], &[], &config);
        let ecart = alerts.iter().find(|a| a.kind == AlertKind::EcartMontant).expect("expected ECART_MONTANT alert");
        assert_eq!(ecart.delta, Some(2.00));
        assert_eq!(ecart.document_id, "gl-1");
    }

    #[test]
    fn missing_reference_number_triggers_numero_manquant() {
        let doc: SourceDocument = json!({"Emetteur": "ACME"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &[], "rl-1", &[], &[("inv-1".to_string(), doc)], &[], &config);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::NumeroManquant));
    }

    #[test]
    fn numero_manquant_binds_document_id_to_the_source_document_not_the_gl() {
        let doc: SourceDocument = json!({"Emetteur": "ACME"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &[], "rl-1", &[], &[("src-doc-7".to_string(), doc)], &[], &config);
        let alert = alerts.iter().find(|a| a.kind == AlertKind::NumeroManquant).expect("expected NUMERO_MANQUANT alert");
        assert_eq!(alert.document_id, "src-doc-7");
    }

    #[test]
    fn missing_transactions_flag_disabled_suppresses_absence_alerts() {
        let entries = vec![entry("411000", "Facture FAC99", 200.0, 0.0)];
        let doc: SourceDocument = json!({"Numéro Facture": "FAC99"}).as_object().unwrap().clone();
        let mut config = AnomalyConfig::default();
        config.alert_on_missing_transactions = false;
        let alerts = detect_anomalies("gl-1", &entries, "rl-1", &[], &[("inv-1".to_string(), doc)], &[], &config);
        assert!(!alerts.iter().any(|a| a.kind == AlertKind::FactureNonRapprocheeGl));
    }

    #[test]
    fn cheque_already_settled_on_bank_account_does_not_trigger_emis_non_encaisse() {
        let entries = vec![
            entry("401000", "Cheque CHQ5 emis", 0.0, 75.0),
            entry("512100", "Cheque CHQ5 debite", 75.0, 0.0),
        ];
        let doc: SourceDocument = json!({"Numéro de Chèque": "CHQ5"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &entries, "rl-1", &[], &[("chq-1".to_string(), doc)], &[], &config);
        assert!(!alerts.iter().any(|a| a.kind == AlertKind::ChequeEmisNonEncaisseGl));
    }

    #[test]
    fn unreconciled_invoice_triggers_facture_non_rapprochee() {
        let entries = vec![entry("411000", "Facture FAC99", 200.0, 0.0)];
        let doc: SourceDocument = json!({"Numéro Facture": "FAC99"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &entries, "rl-1", &[], &[("inv-1".to_string(), doc)], &[], &config);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::FactureNonRapprocheeGl));
    }

    #[test]
    fn cheque_cleared_but_unposted_triggers_non_comptabilise() {
        let operations = vec![operation("CHEQUE CHQ1 remis", -50.0)];
        let doc: SourceDocument = json!({"Numéro de Chèque": "CHQ1"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &[], "rl-1", &operations, &[("chq-1".to_string(), doc)], &[], &config);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::ChequeNonComptabiliseGl));
    }

    #[test]
    fn amounts_within_tolerance_raise_no_alert() {
        let entries = vec![entry("411000", "Facture FAC42", 100.0, 0.0)];
        let operations = vec![operation("VIR FAC42", 100.50)];
        let doc: SourceDocument = json!({"Numéro Facture": "FAC42"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &entries, "rl-1", &operations, &[("inv-1".to_string(), doc)], &[], &config);
        assert!(!alerts.iter().any(|a| a.kind == AlertKind::EcartMontant));
    }

    #[test]
    fn weekend_entry_triggers_jour_non_ouvrable() {
        let mut e = entry("411000", "Facture du samedi", 10.0, 0.0);
        e.date = "2024-01-06".to_string(); // a Saturday
        let config = AnomalyConfig::default();
        let alerts = detect_anomalies("gl-1", &[e], "rl-1", &[], &[], &[], &config);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::JourNonOuvrable));
    }

    #[test]
    fn holiday_date_triggers_jour_non_ouvrable() {
        let mut e = entry("411000", "Facture du jour férié", 10.0, 0.0);
        e.date = "2024-05-01".to_string(); // a Wednesday, but a configured holiday
        let config = AnomalyConfig::default();
        let holidays = vec!["2024-05-01".to_string()];
        let alerts = detect_anomalies("gl-1", &[e], "rl-1", &[], &[], &holidays, &config);
        assert!(alerts.iter().any(|a| a.kind == AlertKind::JourNonOuvrable));
    }

    #[test]
    fn anomaly_detection_is_deterministic_given_identical_inputs() {
        let entries = vec![entry("411000", "Facture FAC42", 100.0, 0.0)];
        let operations = vec![operation("VIR FAC42", 102.0)];
        let doc: SourceDocument = json!({"Numéro Facture": "FAC42"}).as_object().unwrap().clone();
        let config = AnomalyConfig::default();
        let first = detect_anomalies("gl-1", &entries, "rl-1", &operations, &[("inv-1".to_string(), doc.clone())], &[], &config);
        let second = detect_anomalies("gl-1", &entries, "rl-1", &operations, &[("inv-1".to_string(), doc)], &[], &config);
        let strip_ids = |alerts: &[Alert]| -> Vec<(AlertKind, String, Option<f64>)> {
            alerts.iter().map(|a| (a.kind, a.reference.clone(), a.delta)).collect()
        };
        assert_eq!(strip_ids(&first), strip_ids(&second));
    }
}
