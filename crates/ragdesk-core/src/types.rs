//! Domain types shared by the ingestion, vector and store crates.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type Meta = HashMap<String, String>;

pub const META_FILENAME: &str = "filename";
pub const META_CHUNK_INDEX: &str = "chunk_index";

/// A bounded span of document text tagged with its provenance.
///
/// - `text`: the payload that gets embedded
/// - `source`: `<filename>#<ordinal>` for ingested documents
/// - `metadata`: free-form string map (`filename`, `chunk_index`, ...)
///
/// Chunks are immutable once created; the builder-style `with_meta` consumes
/// the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Chunk {
    text: String,
    source: String,
    #[serde(default)]
    metadata: Meta,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self { text: text.into(), source: source.into(), metadata: Meta::new() }
    }

    /// Chunk `ordinal` of the document stored as `filename`.
    pub fn from_document(filename: &str, ordinal: usize, text: impl Into<String>) -> Self {
        Self::new(text, format!("{filename}#{ordinal}"))
            .with_meta(META_FILENAME, filename)
            .with_meta(META_CHUNK_INDEX, ordinal.to_string())
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn text(&self) -> &str { &self.text }
    pub fn source(&self) -> &str { &self.source }
    pub fn metadata(&self) -> &Meta { &self.metadata }
}

/// A scored chunk returned by a similarity search.
///
/// `score` is the raw inner product of two unit vectors, i.e. cosine
/// similarity; higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    pub score: f32,
    pub source: String,
    pub text: String,
    pub metadata: Meta,
}

impl Hit {
    pub fn from_chunk(chunk: &Chunk, score: f32) -> Self {
        Self {
            score,
            source: chunk.source.clone(),
            text: chunk.text.clone(),
            metadata: chunk.metadata.clone(),
        }
    }

    /// Human readable provenance: the filename, else the source id, else `doc`.
    pub fn label(&self) -> &str {
        match self.metadata.get(META_FILENAME) {
            Some(name) if !name.is_empty() => name,
            _ if !self.source.is_empty() => &self.source,
            _ => "doc",
        }
    }
}
