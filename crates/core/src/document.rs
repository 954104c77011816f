//! Generated-document sanitization and structural validation.
//!
//! The content model is prompted to return only the document body, but in
//! practice it sometimes wraps output in Markdown code fences. The
//! orchestrator strips those before the structural check; output that still
//! fails the check is rejected and the attempt reverted.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::CoreError;

/// Marker every accepted document must begin with (case-insensitive).
pub const DOCUMENT_MARKER: &str = "<!doctype html";

fn fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[a-zA-Z]*[ \t]*\r?\n").expect("valid regex"))
}

fn fence_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n```[ \t]*$").expect("valid regex"))
}

/// Strip one layer of wrapping Markdown code fences, if present.
///
/// Leading/trailing whitespace is trimmed either way. Fences inside the
/// document are left alone; only a fence that wraps the entire output is
/// removed.
pub fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(opened) = fence_open().find(trimmed) {
        let rest = &trimmed[opened.end()..];
        if let Some(closed) = fence_close().find(rest) {
            return rest[..closed.start()].trim().to_string();
        }
    }
    trimmed.to_string()
}

/// Structural validity check for a generated document.
///
/// The document must begin with the doctype marker and contain a root
/// `<html>` element. This guarantees structure only -- semantic correctness
/// of the markup is out of scope.
pub fn validate_document(document: &str) -> Result<(), CoreError> {
    let lower = document.trim_start().to_ascii_lowercase();
    if !lower.starts_with(DOCUMENT_MARKER) {
        return Err(CoreError::InvalidOutput(format!(
            "document does not begin with {DOCUMENT_MARKER}"
        )));
    }
    if !lower.contains("<html") || !lower.contains("</html>") {
        return Err(CoreError::InvalidOutput(
            "document is missing a root <html> element".to_string(),
        ));
    }
    Ok(())
}
