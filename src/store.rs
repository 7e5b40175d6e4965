//! Document store contract (A3): the fetch/save boundary the core consumes
//! from its host, plus a filesystem-backed reference implementation used by
//! the CLI and test suite.

use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{ReconError, Result};

/// Mirrors the host's document fetch/save contract (see external interfaces).
/// Production deployments supply their own implementation (e.g. backed by a
/// web application's database); this crate ships only [`FsDocumentStore`].
pub trait DocumentStore {
    fn get_latest(&self, kind: &str) -> Result<(String, Value)>;
    fn get_document(&self, document_id: &str) -> Result<Value>;
    fn save_document(&self, document_id: &str, content: &Value) -> Result<()>;
    fn get_invoice(&self, reference: &str) -> Result<Option<Value>>;
    fn get_cheque(&self, reference: &str) -> Result<Option<Value>>;
}

/// Write to a sibling temp file and rename over the target, so a reader
/// never observes a partially written document.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let tmp_path = path.with_file_name(format!("{file_name}.tmp"));
    std::fs::write(&tmp_path, bytes)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Keeps each document as a `<root>/documents/<id>.json` file, with a small
/// `<root>/latest/<kind>.json` pointer file per document kind
/// (`grandlivre`/`releve`), and invoices/cheques indexed by reference under
/// `<root>/invoices/` and `<root>/cheques/`.
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn document_path(&self, document_id: &str) -> PathBuf {
        self.root.join("documents").join(format!("{document_id}.json"))
    }

    fn latest_pointer_path(&self, kind: &str) -> PathBuf {
        self.root.join("latest").join(format!("{kind}.json"))
    }

    fn invoice_path(&self, reference: &str) -> PathBuf {
        self.root.join("invoices").join(format!("{reference}.json"))
    }

    fn cheque_path(&self, reference: &str) -> PathBuf {
        self.root.join("cheques").join(format!("{reference}.json"))
    }

    /// Point `kind`'s "latest" document at `document_id`. Used by `demo`
    /// seeding and by anything that imports a new GL/RL version.
    pub fn set_latest(&self, kind: &str, document_id: &str) -> Result<()> {
        let pointer = serde_json::json!({ "document_id": document_id });
        atomic_write(&self.latest_pointer_path(kind), serde_json::to_vec_pretty(&pointer)?.as_slice())
    }

    pub fn save_invoice(&self, reference: &str, content: &Value) -> Result<()> {
        atomic_write(&self.invoice_path(reference), serde_json::to_vec_pretty(content)?.as_slice())
    }

    pub fn save_cheque(&self, reference: &str, content: &Value) -> Result<()> {
        atomic_write(&self.cheque_path(reference), serde_json::to_vec_pretty(content)?.as_slice())
    }

    /// CLI-only convenience: every invoice/cheque on disk, keyed by the
    /// reference it was saved under. Not part of the host-facing
    /// [`DocumentStore`] contract, which only looks up one reference at a time.
    pub fn list_source_documents(&self) -> Result<Vec<(String, Value)>> {
        let mut out = Vec::new();
        for dir in [self.root.join("invoices"), self.root.join("cheques")] {
            if !dir.exists() {
                continue;
            }
            for entry in std::fs::read_dir(&dir)? {
                let path = entry?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                let reference = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                out.push((reference, read_json(&path)?));
            }
        }
        Ok(out)
    }
}

impl DocumentStore for FsDocumentStore {
    fn get_latest(&self, kind: &str) -> Result<(String, Value)> {
        let pointer = read_json(&self.latest_pointer_path(kind))
            .map_err(|_| ReconError::UnknownDocument(format!("no latest {kind} document")))?;
        let document_id = pointer
            .get("document_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ReconError::MalformedDocument(format!("latest {kind} pointer missing document_id")))?
            .to_string();
        let content = self.get_document(&document_id)?;
        Ok((document_id, content))
    }

    fn get_document(&self, document_id: &str) -> Result<Value> {
        read_json(&self.document_path(document_id)).map_err(|_| ReconError::UnknownDocument(document_id.to_string()))
    }

    fn save_document(&self, document_id: &str, content: &Value) -> Result<()> {
        atomic_write(&self.document_path(document_id), serde_json::to_vec_pretty(content)?.as_slice())
    }

    fn get_invoice(&self, reference: &str) -> Result<Option<Value>> {
        let path = self.invoice_path(reference);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_json(&path)?))
    }

    fn get_cheque(&self, reference: &str) -> Result<Option<Value>> {
        let path = self.cheque_path(reference);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_json(&path)?))
    }
}
