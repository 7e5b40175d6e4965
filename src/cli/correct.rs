//! `reco correct`: apply a user-edited correction to a document.

use crate::cli::CorrectionKind;
use crate::correction::{apply_correction, DocumentKind};
use crate::error::Result;
use crate::store::{DocumentStore, FsDocumentStore};

pub fn run(data_dir: &std::path::Path, document_id: &str, reference: &str, content_file: &str, kind: CorrectionKind) -> Result<()> {
    let store = FsDocumentStore::new(data_dir);
    let document = store.get_document(document_id)?;

    let content_text = std::fs::read_to_string(content_file)?;
    let new_content: serde_json::Value = serde_json::from_str(&content_text)?;

    let kind = match kind {
        CorrectionKind::Gl => DocumentKind::Gl,
        CorrectionKind::Rl => DocumentKind::Rl,
        CorrectionKind::Source => DocumentKind::SourceDoc,
    };

    let corrected = apply_correction(&document, kind, reference, &new_content)?;
    store.save_document(document_id, &corrected)?;
    println!("Corrected {document_id} (ref {reference})");
    Ok(())
}
