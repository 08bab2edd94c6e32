//! Single-file index container.
//!
//! Layout of `rag.index`:
//!
//! ```text
//! magic   8 bytes   b"RAGDIDX\0"
//! version 4 bytes   little-endian u32
//! digest  32 bytes  blake3 of the payload
//! payload rest      bincode(IndexPayload)
//! ```
//!
//! The payload carries the header, the vectors and the chunk rows together,
//! so vectors and metadata can never be persisted out of step. Writes go to a
//! temp file in the target directory which is then renamed over the target.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bincode::config::standard as bincode_config;
use bincode::{decode_from_slice, encode_to_vec, Decode, Encode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use ragdesk_core::error::{Error, Result};
use ragdesk_core::types::Chunk;

pub const INDEX_FILE_NAME: &str = "rag.index";
pub const FORMAT_VERSION: u32 = 1;

const MAGIC: &[u8; 8] = b"RAGDIDX\0";
const PREAMBLE_LEN: usize = 8 + 4 + 32;

/// Describes a persisted index; reported by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct IndexHeader {
    pub version: u32,
    pub embedder_id: String,
    pub dim: usize,
    pub rows: usize,
    /// RFC 3339
    pub created_at: String,
}

impl IndexHeader {
    pub fn new(embedder_id: impl Into<String>, dim: usize, rows: usize) -> Self {
        Self {
            version: FORMAT_VERSION,
            embedder_id: embedder_id.into(),
            dim,
            rows,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Encode, Decode)]
pub struct IndexPayload {
    pub header: IndexHeader,
    pub vectors: Vec<Vec<f32>>,
    pub chunks: Vec<Chunk>,
}

impl IndexPayload {
    /// Positional consistency between header, vectors and chunks.
    pub fn validate(&self) -> Result<()> {
        let rows = self.header.rows;
        if self.vectors.len() != rows || self.chunks.len() != rows {
            return Err(Error::IndexUnavailable(format!(
                "row count mismatch: header {rows}, vectors {}, chunks {}",
                self.vectors.len(),
                self.chunks.len()
            )));
        }
        if let Some(v) = self.vectors.iter().find(|v| v.len() != self.header.dim) {
            return Err(Error::IndexUnavailable(format!(
                "vector of dimension {} in an index of dimension {}",
                v.len(),
                self.header.dim
            )));
        }
        Ok(())
    }
}

pub struct IndexFile {
    path: PathBuf,
}

impl IndexFile {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    /// `<data_dir>/rag.index`
    pub fn in_dir(data_dir: &Path) -> Self { Self::new(data_dir.join(INDEX_FILE_NAME)) }

    pub fn path(&self) -> &Path { &self.path }

    pub fn exists(&self) -> bool { self.path.is_file() }

    pub fn save(&self, payload: &IndexPayload) -> Result<()> {
        payload.validate()?;
        let body = encode_to_vec(payload, bincode_config())
            .map_err(|e| Error::Other(anyhow::anyhow!("failed to encode index: {e}")))?;
        let mut bytes = Vec::with_capacity(PREAMBLE_LEN + body.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(blake3::hash(&body).as_bytes());
        bytes.extend_from_slice(&body);

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        info!(path = %self.path.display(), rows = payload.header.rows, bytes = bytes.len(), "index persisted");
        Ok(())
    }

    /// Read and verify the container. Any problem is `IndexUnavailable`.
    pub fn load(&self) -> Result<IndexPayload> {
        let bytes = fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::IndexUnavailable(format!("{} does not exist", self.path.display())),
            _ => Error::IndexUnavailable(format!("failed to read {}: {e}", self.path.display())),
        })?;
        if bytes.len() < PREAMBLE_LEN || &bytes[..8] != MAGIC {
            return Err(Error::IndexUnavailable(format!("{} is not an index file", self.path.display())));
        }
        let mut version = [0u8; 4];
        version.copy_from_slice(&bytes[8..12]);
        let version = u32::from_le_bytes(version);
        if version != FORMAT_VERSION {
            return Err(Error::IndexUnavailable(format!("unsupported index format version {version}")));
        }
        let body = &bytes[PREAMBLE_LEN..];
        if blake3::hash(body).as_bytes()[..] != bytes[12..PREAMBLE_LEN] {
            return Err(Error::IndexUnavailable("checksum mismatch".into()));
        }
        let (payload, _): (IndexPayload, usize) = decode_from_slice(body, bincode_config())
            .map_err(|e| Error::IndexUnavailable(format!("failed to decode index: {e}")))?;
        payload.validate()?;
        debug!(path = %self.path.display(), rows = payload.header.rows, "index loaded");
        Ok(payload)
    }

    /// Delete the container; a missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
