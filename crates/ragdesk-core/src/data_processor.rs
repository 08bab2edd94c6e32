use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};
use crate::loader::{is_supported, load_document};
use crate::types::Chunk;

/// A document that could not be read or parsed during a directory scan.
#[derive(Debug, Clone, Serialize)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a scan: chunks from every readable document plus the failures.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub chunks: Vec<Chunk>,
    pub files_read: usize,
    pub failures: Vec<IngestFailure>,
}

#[derive(Debug, Default)]
pub struct DataProcessor {
    chunking_config: ChunkingConfig,
}

impl DataProcessor {
    pub fn new(chunking_config: ChunkingConfig) -> Self { Self { chunking_config } }

    /// Load and chunk every supported document directly under `docs_dir`.
    ///
    /// Creates the directory when missing. A document that fails is logged
    /// and reported, the remaining files are still processed.
    pub fn process_directory(&self, docs_dir: &Path) -> Result<IngestReport> {
        fs::create_dir_all(docs_dir)?;
        let report = self.process_files(list_documents(docs_dir));
        info!(
            dir = %docs_dir.display(),
            files = report.files_read,
            chunks = report.chunks.len(),
            failed = report.failures.len(),
            "ingested documents"
        );
        Ok(report)
    }

    /// Load and chunk `files` in order, isolating per-file failures.
    pub fn process_files(&self, files: Vec<PathBuf>) -> IngestReport {
        let mut report = IngestReport::default();
        for path in files {
            match self.process_file(&path) {
                Ok(chunks) => {
                    report.files_read += 1;
                    report.chunks.extend(chunks);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping document");
                    report.failures.push(IngestFailure { path, reason: e.to_string() });
                }
            }
        }
        report
    }

    pub fn process_file(&self, path: &Path) -> Result<Vec<Chunk>> {
        let text = load_document(path).map_err(|e| match e {
            Error::Ingestion { .. } => e,
            other => Error::Ingestion { path: path.to_path_buf(), reason: other.to_string() },
        })?;
        let filename = file_name(path);
        Ok(self
            .chunking_config
            .chunk(&text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Chunk::from_document(&filename, ordinal, text))
            .collect())
    }
}

/// Supported documents directly under `root`, sorted by path.
pub fn list_documents(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|p| is_supported(p))
        .collect();
    files.sort();
    files
}

fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}
