//! Purpose: Format stdout summaries and stderr diagnostics for `canvasctl`.
//! Exports: Summary builders, `import_count`, `echoed_element`, `error_text`.
//! Role: Pure formatting; callers decide where the text is written.
//! Invariants: Import counts prefer `count`, then `elements.len()`, then the submitted length.
use canvasctl::api::{Envelope, Error, ErrorKind, ImportMode};
use serde_json::Value;
use std::error::Error as StdError;
use std::path::Path;

pub(crate) fn clear_summary(count: u64) -> String {
    format!("Cleared {count} {} from the canvas", element_noun(count))
}

pub(crate) fn import_summary(count: u64, mode: ImportMode) -> String {
    format!(
        "Imported {count} {} (mode: {})",
        element_noun(count),
        mode.as_str()
    )
}

pub(crate) fn export_summary(count: usize, path: &Path) -> String {
    let count = count as u64;
    format!(
        "Exported {count} {} to {}",
        element_noun(count),
        path.display()
    )
}

pub(crate) fn delete_summary(id: &str) -> String {
    format!("Deleted element {id}")
}

pub(crate) fn import_count(envelope: &Envelope, submitted: usize) -> u64 {
    envelope
        .count()
        .or_else(|| envelope.elements().map(|elements| elements.len() as u64))
        .unwrap_or(submitted as u64)
}

/// The `element` field when present, otherwise the whole envelope.
pub(crate) fn echoed_element(envelope: &Envelope) -> &Value {
    envelope.element().unwrap_or(envelope.as_value())
}

fn element_noun(count: u64) -> &'static str {
    if count == 1 { "element" } else { "elements" }
}

pub(crate) fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    if let Some(url) = err.url() {
        lines.push(format!("url: {url}"));
    }
    for cause in error_causes(err) {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Input => "invalid input".to_string(),
        ErrorKind::Transport => "request failed".to_string(),
        ErrorKind::Protocol => "canvas server reported a failure".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Internal => "internal error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}
