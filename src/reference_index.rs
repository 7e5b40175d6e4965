//! Reference index (C5): cross-document lookup tables keyed by reference
//! token (invoice/cheque numbers), built by substring search over GL labels
//! and RL natures.

use std::collections::BTreeMap;

use crate::models::{BankOperation, LedgerEntry, SourceDocument};

const CARRIER_FIELDS: &[&str] = &["Numéro Facture", "Numéro de Chèque"];

#[derive(Debug, Default)]
pub struct ReferenceIndex {
    pub gl_by_ref: BTreeMap<String, Vec<LedgerEntry>>,
    pub rl_by_ref: BTreeMap<String, Vec<BankOperation>>,
    pub docs_by_ref: BTreeMap<String, SourceDocument>,
}

impl ReferenceIndex {
    /// Build the index from the cross-document universe of one detection pass.
    pub fn build(entries: &[LedgerEntry], operations: &[BankOperation], documents: &[SourceDocument]) -> Self {
        let mut index = ReferenceIndex::default();

        for doc in documents {
            for reference in extract_references(doc) {
                for entry in entries {
                    if entry.label.contains(&reference) {
                        index.gl_by_ref.entry(reference.clone()).or_default().push(entry.clone());
                    }
                }
                for operation in operations {
                    if operation.nature.contains(&reference) {
                        index.rl_by_ref.entry(reference.clone()).or_default().push(operation.clone());
                    }
                }
                index.docs_by_ref.insert(reference, doc.clone());
            }
        }

        index
    }
}

/// Pull reference tokens out of a source document's known carrier fields.
fn extract_references(doc: &SourceDocument) -> Vec<String> {
    CARRIER_FIELDS
        .iter()
        .filter_map(|field| doc.get(*field))
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(account: &str, label: &str) -> LedgerEntry {
        LedgerEntry {
            account: account.to_string(),
            label: label.to_string(),
            date: String::new(),
            debit: 0.0,
            credit: 0.0,
        }
    }

    fn operation(nature: &str) -> BankOperation {
        BankOperation {
            date: String::new(),
            nature: nature.to_string(),
            montant: 0.0,
            r#type: String::new(),
        }
    }

    #[test]
    fn indexes_gl_entries_by_ref_substring() {
        let entries = vec![entry("411000", "Facture FAC0012 client Dupont"), entry("512100", "Virement sans ref")];
        let doc = json!({"Numéro Facture": "FAC0012"}).as_object().unwrap().clone();
        let index = ReferenceIndex::build(&entries, &[], &[doc]);
        assert_eq!(index.gl_by_ref["FAC0012"].len(), 1);
    }

    #[test]
    fn indexes_rl_operations_by_ref_substring() {
        let operations = vec![operation("CHEQUE CHQ9981 remis"), operation("VIR divers")];
        let doc = json!({"Numéro de Chèque": "CHQ9981"}).as_object().unwrap().clone();
        let index = ReferenceIndex::build(&[], &operations, &[doc]);
        assert_eq!(index.rl_by_ref["CHQ9981"].len(), 1);
    }

    #[test]
    fn documents_with_no_carrier_field_contribute_no_refs() {
        let doc = json!({"Emetteur": "ACME"}).as_object().unwrap().clone();
        let index = ReferenceIndex::build(&[], &[], &[doc]);
        assert!(index.docs_by_ref.is_empty());
    }

    #[test]
    fn ties_are_preserved_as_lists() {
        let entries = vec![entry("411000", "FAC0012 part 1"), entry("411000", "FAC0012 part 2")];
        let doc = json!({"Numéro Facture": "FAC0012"}).as_object().unwrap().clone();
        let index = ReferenceIndex::build(&entries, &[], &[doc]);
        assert_eq!(index.gl_by_ref["FAC0012"].len(), 2);
    }
}
