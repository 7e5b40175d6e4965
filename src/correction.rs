//! Correction orchestrator (C8): applies a user-edited correction to one
//! document, preserving unrelated entries and atomically replacing the
//! subset matching the alert's reference.

use serde_json::Value;

use crate::entry::LABEL_ALIASES;
use crate::error::{ReconError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Gl,
    Rl,
    SourceDoc,
}

/// Apply one correction. Callers are expected to persist the returned
/// document via a [`crate::store::DocumentStore`]; this function is pure.
///
/// For GL/RL, `new_content` is the replacement subset (an array, or a single
/// object treated as a one-element array). Corrected entries are expected to
/// still carry `reference` in their label/nature — that is what keeps a
/// repeated application idempotent.
pub fn apply_correction(document: &Value, kind: DocumentKind, reference: &str, new_content: &Value) -> Result<Value> {
    match kind {
        DocumentKind::Gl => partition_replace(document, "ecritures_comptables", reference, new_content, label_of),
        DocumentKind::Rl => partition_replace(document, "operations", reference, new_content, nature_of),
        DocumentKind::SourceDoc => shallow_merge(document, new_content),
    }
}

fn label_of(record: &Value) -> Option<String> {
    let obj = record.as_object()?;
    LABEL_ALIASES.iter().find_map(|alias| obj.get(*alias)).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn nature_of(record: &Value) -> Option<String> {
    let obj = record.as_object()?;
    obj.get("nature").or_else(|| obj.get("Nature")).and_then(|v| v.as_str()).map(|s| s.to_string())
}

fn partition_replace(
    document: &Value,
    list_key: &str,
    reference: &str,
    new_content: &Value,
    carrier: impl Fn(&Value) -> Option<String>,
) -> Result<Value> {
    let mut map = document
        .as_object()
        .cloned()
        .ok_or_else(|| ReconError::MalformedDocument("document is not a JSON object".to_string()))?;
    let list = map
        .get(list_key)
        .and_then(|v| v.as_array())
        .cloned()
        .ok_or_else(|| ReconError::MalformedDocument(format!("document has no `{list_key}` array")))?;

    let mut retained: Vec<Value> =
        list.into_iter().filter(|item| carrier(item).map(|s| !s.contains(reference)).unwrap_or(true)).collect();

    let additions = match new_content {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    };
    retained.extend(additions);

    map.insert(list_key.to_string(), Value::Array(retained));
    Ok(Value::Object(map))
}

fn shallow_merge(document: &Value, new_content: &Value) -> Result<Value> {
    let mut map = document
        .as_object()
        .cloned()
        .ok_or_else(|| ReconError::MalformedDocument("document is not a JSON object".to_string()))?;
    let additions = new_content
        .as_object()
        .cloned()
        .ok_or_else(|| ReconError::MalformedDocument("correction content is not a JSON object".to_string()))?;
    map.extend(additions);
    Ok(Value::Object(map))
}
