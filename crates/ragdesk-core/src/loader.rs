//! Plain-text extraction for `.txt`, `.md` and `.pdf` documents.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md", "markdown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Pdf,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "md" | "markdown" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

pub fn is_supported(path: &Path) -> bool {
    DocumentKind::from_path(path).is_some()
}

/// Extract the plain text of a supported document.
pub fn load_document(path: &Path) -> Result<String> {
    match DocumentKind::from_path(path) {
        Some(DocumentKind::Text) => read_text(path),
        Some(DocumentKind::Pdf) => read_pdf(path),
        None => Err(Error::UnsupportedFormat(path.display().to_string())),
    }
}

pub fn read_text(path: &Path) -> Result<String> {
    Ok(decode_text(fs::read(path)?))
}

/// UTF-8 first; bytes that are not valid UTF-8 are read as Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Pages are joined with `\n`; a page without extractable text yields `""`.
pub fn read_pdf(path: &Path) -> Result<String> {
    let doc = lopdf::Document::load(path).map_err(|e| Error::Ingestion {
        path: path.to_path_buf(),
        reason: format!("unreadable PDF: {e}"),
    })?;
    let pages: Vec<String> = doc
        .get_pages()
        .keys()
        .map(|&page| match doc.extract_text(&[page]) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), page, error = %e, "no extractable text on page");
                String::new()
            }
        })
        .collect();
    Ok(pages.join("\n"))
}
