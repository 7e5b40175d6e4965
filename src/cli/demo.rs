//! `reco demo`: seed a data directory with a sample GL, RL, invoice, and
//! cheque so the pipeline can be explored immediately.

use serde_json::json;

use crate::error::Result;
use crate::store::{DocumentStore, FsDocumentStore};

pub fn run(data_dir: &std::path::Path) -> Result<()> {
    let store = FsDocumentStore::new(data_dir);

    let gl = json!({
        "ecritures_comptables": [
            {"n° compte": "512100", "libellé": "Virement client Dupont FAC1001", "date": "05/01/2024", "débit": "1 500,00", "crédit": 0},
            {"n° compte": "411000", "libellé": "Facture FAC1001 - Dupont", "date": "02/01/2024", "débit": 0, "crédit": "1 500,00"},
            {"n° compte": "411000", "libellé": "Facture FAC1002 - Martin", "date": "03/01/2024", "débit": 0, "crédit": "800,00"},
            {"n° compte": "401000", "libellé": "Chèque CHQ2001 fournisseur ACME", "date": "04/01/2024", "débit": "300,00", "crédit": 0},
            {"n° compte": "611000", "libellé": "Loyer janvier", "date": "06/01/2024", "débit": "950,00", "crédit": 0},
        ],
        "company": "Demo SARL",
    });
    store.save_document("grandlivre-2024-01", &gl)?;
    store.set_latest("grandlivre", "grandlivre-2024-01")?;

    let rl = json!({
        "operations": [
            {"date": "05/01/2024", "nature": "VIR CLIENT FAC1001 DUPONT", "montant": "1 500,00", "type": "credit"},
            {"date": "07/01/2024", "nature": "CHEQUE CHQ1999 DEBIT", "montant": "-220,00", "type": "debit"},
        ],
    });
    store.save_document("releve-2024-01", &rl)?;
    store.set_latest("releve", "releve-2024-01")?;

    store.save_invoice(
        "FAC1002",
        &json!({
            "Numéro Facture": "FAC1002",
            "Total TTC": 800.0,
            "Date Facturation": "2024-01-03",
            "Nom Client/Fournisseur": "Martin",
        }),
    )?;

    store.save_cheque(
        "CHQ2001",
        &json!({
            "Numéro de Chèque": "CHQ2001",
            "Montant du Chèque": 300.0,
            "Le": "2024-01-04",
            "Emetteur": "ACME",
            "Banque": "Société Générale",
        }),
    )?;

    println!("Seeded sample data under {}", data_dir.display());
    println!("Try: reco analyze grandlivre-2024-01");
    println!("Try: reco reconcile");
    Ok(())
}
