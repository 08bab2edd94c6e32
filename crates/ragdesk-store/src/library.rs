//! Administrative operations over the documents directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use ragdesk_core::chunker::ChunkingConfig;
use ragdesk_core::data_processor::{list_documents, DataProcessor, IngestFailure};
use ragdesk_core::error::{Error, Result};
use ragdesk_core::loader::is_supported;

use crate::store::RetrievalStore;

#[derive(Debug, Clone, Serialize)]
pub struct ReindexReport {
    pub files: usize,
    pub chunks: usize,
    pub failures: Vec<IngestFailure>,
}

pub struct DocumentLibrary {
    docs_dir: PathBuf,
    processor: DataProcessor,
    store: Arc<RetrievalStore>,
}

impl DocumentLibrary {
    pub fn new(docs_dir: impl Into<PathBuf>, chunking: ChunkingConfig, store: Arc<RetrievalStore>) -> Self {
        Self { docs_dir: docs_dir.into(), processor: DataProcessor::new(chunking), store }
    }

    pub fn docs_dir(&self) -> &Path { &self.docs_dir }

    pub fn store(&self) -> &Arc<RetrievalStore> { &self.store }

    pub fn status(&self) -> bool { self.store.status() }

    /// Store a document under its bare file name. Does not reindex.
    pub fn upload(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = safe_file_name(file_name)?;
        fs::create_dir_all(&self.docs_dir)?;
        let dest = self.docs_dir.join(name);
        fs::write(&dest, bytes)?;
        info!(path = %dest.display(), bytes = bytes.len(), "document stored");
        Ok(dest)
    }

    /// Rebuild the index from everything in the documents directory.
    pub fn reindex(&self) -> Result<ReindexReport> {
        let ingest = self.processor.process_directory(&self.docs_dir)?;
        let report = self.store.build_index(ingest.chunks)?;
        Ok(ReindexReport { files: ingest.files_read, chunks: report.chunks, failures: ingest.failures })
    }

    pub fn list_files(&self) -> Result<Vec<String>> {
        if !self.docs_dir.is_dir() {
            return Ok(Vec::new());
        }
        Ok(list_documents(&self.docs_dir)
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect())
    }

    /// Remove a document and rebuild. Returns `None` when the library is now
    /// empty, in which case the index is cleared instead.
    ///
    /// The index is rebuilt from the remaining documents before the file is
    /// unlinked; if the rebuild fails the document and the old index both stay.
    pub fn delete_file(&self, file_name: &str) -> Result<Option<ReindexReport>> {
        let name = safe_file_name(file_name).map_err(|_| Error::NotFound(file_name.to_string()))?;
        let path = self.docs_dir.join(name);
        if !path.is_file() {
            return Err(Error::NotFound(name.to_string()));
        }

        let remaining: Vec<PathBuf> = list_documents(&self.docs_dir).into_iter().filter(|p| p != &path).collect();
        let ingest = self.processor.process_files(remaining);
        let report = if ingest.chunks.is_empty() {
            self.store.clear()?;
            None
        } else {
            let built = self.store.build_index(ingest.chunks)?;
            Some(ReindexReport { files: ingest.files_read, chunks: built.chunks, failures: ingest.failures })
        };

        fs::remove_file(&path)?;
        info!(path = %path.display(), "document deleted");
        Ok(report)
    }
}

/// Final path component of `file_name`, provided it names a supported,
/// non-hidden document.
fn safe_file_name(file_name: &str) -> Result<&str> {
    let name = file_name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    if name.is_empty() || name.starts_with('.') {
        return Err(Error::UnsupportedFormat(format!("invalid file name {file_name:?}")));
    }
    if !is_supported(Path::new(name)) {
        return Err(Error::UnsupportedFormat(format!("{name} (use .pdf, .txt or .md)")));
    }
    Ok(name)
}
