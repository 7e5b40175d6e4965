//! Alert store & guides (C7): an in-process alert registry keyed by opaque
//! id, and resolution of each alert kind to a corrective guide template.

use std::collections::{BTreeMap, HashSet};

use crate::models::{Alert, AlertKind, Guide};

fn guide_for_kind(kind: AlertKind) -> Guide {
    match kind {
        AlertKind::FactureNonRapprocheeGl => Guide {
            title: "Facture non rapprochée".to_string(),
            action: "Post the settlement entry against the bank account".to_string(),
            suggested_account: "512200".to_string(),
            counter_entry_hint: "Debit 512200 (bank), credit the client/supplier account".to_string(),
            label_template: "Règlement facture {ref} - {name}".to_string(),
        },
        AlertKind::ChequeNonComptabiliseGl => Guide {
            title: "Chèque non comptabilisé".to_string(),
            action: "Post the cheque to the GL".to_string(),
            suggested_account: "512200".to_string(),
            counter_entry_hint: "Debit the origin account, credit 512200 (bank)".to_string(),
            label_template: "Chèque {ref} - {name}".to_string(),
        },
        AlertKind::ChequeEmisNonEncaisseGl => Guide {
            title: "Chèque émis non encaissé".to_string(),
            action: "Confirm the cheque is still outstanding; no entry required until it clears".to_string(),
            suggested_account: "512200".to_string(),
            counter_entry_hint: "Leave in transit until the bank statement shows it clearing".to_string(),
            label_template: "Chèque en circulation {ref} - {name}".to_string(),
        },
        AlertKind::ChequeEncaisseNonEmisGl => Guide {
            title: "Chèque encaissé non émis".to_string(),
            action: "Post the missing issuance entry in the GL".to_string(),
            suggested_account: "411000".to_string(),
            counter_entry_hint: "Debit the origin account, credit 512200 (bank)".to_string(),
            label_template: "Chèque {ref} - {name}".to_string(),
        },
        AlertKind::ChequeIncoherentGl => Guide {
            title: "Chèque incohérent".to_string(),
            action: "Investigate the amount mismatch between the GL and the bank statement".to_string(),
            suggested_account: "658000".to_string(),
            counter_entry_hint: "Post the difference to 658000 (miscellaneous losses) once confirmed".to_string(),
            label_template: "Écart chèque {ref} - {name}".to_string(),
        },
        AlertKind::EcartMontant => Guide {
            title: "Écart de montant".to_string(),
            action: "Reconcile the amount difference between the GL and the bank statement".to_string(),
            suggested_account: "658000".to_string(),
            counter_entry_hint: "Post the difference to 658000 (miscellaneous losses) once confirmed".to_string(),
            label_template: "Écart de montant {ref} - {name}".to_string(),
        },
        AlertKind::NumeroManquant => Guide {
            title: "Numéro manquant".to_string(),
            action: "Request the missing invoice/cheque number from the counterparty".to_string(),
            suggested_account: "411000".to_string(),
            counter_entry_hint: "No posting until the reference is known".to_string(),
            label_template: "Référence manquante - {name}".to_string(),
        },
        AlertKind::JourNonOuvrable => Guide {
            title: "Jour non ouvrable".to_string(),
            action: "Confirm the transaction date; it falls on a weekend or holiday".to_string(),
            suggested_account: "411000".to_string(),
            counter_entry_hint: "No posting change required if the date is confirmed correct".to_string(),
            label_template: "Date hors jours ouvrés {ref} - {name}".to_string(),
        },
    }
}

/// Localized titles fall back to their `kind` through this table when an
/// alert arrives with a `title` but no `kind` the guide table recognizes.
const TITLE_ALIASES: &[(&str, AlertKind)] = &[
    ("Facture non rapprochée", AlertKind::FactureNonRapprocheeGl),
    ("Chèque non comptabilisé", AlertKind::ChequeNonComptabiliseGl),
    ("Chèque émis non encaissé", AlertKind::ChequeEmisNonEncaisseGl),
    ("Chèque encaissé non émis", AlertKind::ChequeEncaisseNonEmisGl),
    ("Chèque incohérent", AlertKind::ChequeIncoherentGl),
    ("Écart de montant", AlertKind::EcartMontant),
    ("Numéro manquant", AlertKind::NumeroManquant),
    ("Jour non ouvrable", AlertKind::JourNonOuvrable),
];

/// Resolve a guide: direct `kind` lookup first, then `title` through the
/// alias table, then `None` (the UI must handle a missing guide).
pub fn resolve_guide(kind: Option<AlertKind>, title: Option<&str>) -> Option<Guide> {
    if let Some(kind) = kind {
        return Some(guide_for_kind(kind));
    }
    let alias_kind = title.and_then(|title| TITLE_ALIASES.iter().find(|(alias, _)| *alias == title).map(|(_, k)| *k))?;
    Some(guide_for_kind(alias_kind))
}

/// In-process alert registry. A fresh detection pass supersedes, rather than
/// appends to, any prior alert sharing the same `(document_id, kind, ref)`.
#[derive(Debug, Default)]
pub struct AlertStore {
    alerts: BTreeMap<u64, Alert>,
    next_id: u64,
}

impl AlertStore {
    pub fn new() -> Self {
        AlertStore { alerts: BTreeMap::new(), next_id: 1 }
    }

    pub fn record_pass(&mut self, fresh: Vec<Alert>) {
        let fresh_keys: HashSet<(String, AlertKind, String)> =
            fresh.iter().map(|a| (a.document_id.clone(), a.kind, a.reference.clone())).collect();
        self.alerts.retain(|_, a| !fresh_keys.contains(&(a.document_id.clone(), a.kind, a.reference.clone())));
        for mut alert in fresh {
            alert.id = self.next_id;
            self.next_id += 1;
            self.alerts.insert(alert.id, alert);
        }
    }

    pub fn get(&self, id: u64) -> Option<(&Alert, Option<crate::models::Guide>)> {
        self.alerts.get(&id).map(|alert| (alert, resolve_guide(Some(alert.kind), alert.title.as_deref())))
    }

    pub fn all(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.values()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
