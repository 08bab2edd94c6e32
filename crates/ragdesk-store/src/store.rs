use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::Serialize;
use tracing::{debug, info, warn};

use ragdesk_core::config::Settings;
use ragdesk_core::error::{Error, Result};
use ragdesk_core::types::{Chunk, Hit};
use ragdesk_embed::EmbeddingClient;
use ragdesk_vector::{FlatIndex, IndexFile, IndexHeader, IndexPayload};

/// An immutable, loaded index: vectors and chunks share positions.
#[derive(Debug)]
struct IndexSnapshot {
    header: IndexHeader,
    index: FlatIndex,
    chunks: Vec<Chunk>,
}

impl IndexSnapshot {
    fn from_payload(payload: IndexPayload) -> Result<Self> {
        payload.validate()?;
        let IndexPayload { header, vectors, chunks } = payload;
        let index = FlatIndex::build(vectors)?;
        Ok(Self { header, index, chunks })
    }

    fn len(&self) -> usize { self.chunks.len() }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Hit>> {
        Ok(self
            .index
            .search(query, k)?
            .into_iter()
            .filter_map(|(score, pos)| self.chunks.get(pos).map(|c| Hit::from_chunk(c, score)))
            .collect())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub chunks: usize,
    pub dim: usize,
    pub embedder_id: String,
    pub path: PathBuf,
}

/// The loaded snapshot plus a counter bumped on every build and clear.
#[derive(Default)]
struct Slot {
    snapshot: Option<Arc<IndexSnapshot>>,
    generation: u64,
}

/// Owns the current index snapshot and the persisted container.
///
/// Readers clone the snapshot `Arc` once per call. `build_lock` serialises
/// builds and clears and is held across embedding, persisting and swapping.
/// Lazy loading does not take it: a load only installs its snapshot if no
/// build or clear happened while the file was being read.
pub struct RetrievalStore {
    embedder: EmbeddingClient,
    file: IndexFile,
    current: RwLock<Slot>,
    build_lock: Mutex<()>,
}

impl RetrievalStore {
    pub fn new(embedder: EmbeddingClient, data_dir: &Path) -> Self {
        Self {
            embedder,
            file: IndexFile::in_dir(data_dir),
            current: RwLock::new(Slot::default()),
            build_lock: Mutex::new(()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let embedder = EmbeddingClient::from_settings(&settings.embedding)?;
        Ok(Self::new(embedder, &settings.paths.data_dir))
    }

    pub fn embedder(&self) -> &EmbeddingClient { &self.embedder }

    pub fn index_path(&self) -> &Path { self.file.path() }

    /// Load the persisted index if nothing is loaded yet. Never fails: a
    /// missing or unreadable container just means "not loaded".
    pub fn ensure_loaded(&self) -> bool {
        let generation = {
            let slot = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if slot.snapshot.is_some() {
                return true;
            }
            slot.generation
        };
        if !self.file.exists() {
            debug!(path = %self.file.path().display(), "no persisted index");
            return false;
        }
        let snapshot = match self.file.load().and_then(IndexSnapshot::from_payload) {
            Ok(s) => s,
            Err(e) => {
                warn!(path = %self.file.path().display(), error = %e, "ignoring persisted index");
                return false;
            }
        };

        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if slot.generation != generation || slot.snapshot.is_some() {
            debug!("index changed while loading; keeping the newer state");
            return slot.snapshot.is_some();
        }
        if let Some(id) = self.embedder.embedder_id() {
            if id != snapshot.header.embedder_id {
                warn!(
                    index_embedder = %snapshot.header.embedder_id,
                    configured = id,
                    "index was built with a different embedder; rebuild it"
                );
            }
        }
        info!(rows = snapshot.len(), dim = snapshot.header.dim, "index loaded");
        slot.snapshot = Some(Arc::new(snapshot));
        true
    }

    /// Embed `chunks`, persist them and replace the in-memory index.
    ///
    /// An empty corpus is rejected before any I/O, so a previously persisted
    /// index stays untouched.
    pub fn build_index(&self, chunks: Vec<Chunk>) -> Result<BuildReport> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let texts: Vec<String> = chunks.iter().map(|c| c.text().to_string()).collect();
        let vectors = self.embedder.embed(&texts)?;
        let dim = vectors.first().map_or(0, Vec::len);
        let embedder_id = self.embedder.embedder_id().unwrap_or_default().to_string();

        let payload = IndexPayload { header: IndexHeader::new(embedder_id.clone(), dim, chunks.len()), vectors, chunks };
        self.file.save(&payload)?;
        let snapshot = IndexSnapshot::from_payload(payload)?;
        let report = BuildReport { chunks: snapshot.len(), dim, embedder_id, path: self.file.path().to_path_buf() };

        self.install(Some(Arc::new(snapshot)));
        info!(chunks = report.chunks, dim, embedder = %report.embedder_id, "index built");
        Ok(report)
    }

    /// Top `k` chunks for `query`, best first.
    ///
    /// Returns nothing when no index is available, the query is blank or `k`
    /// is zero. Embedding problems (including a missing provider) are errors.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<Hit>> {
        if !self.ensure_loaded() {
            return Ok(Vec::new());
        }
        if query.trim().is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let Some(snapshot) = self.current_snapshot() else { return Ok(Vec::new()) };

        let q = self.embedder.embed_one(query)?;
        if q.len() != snapshot.header.dim {
            warn!(
                index_dim = snapshot.header.dim,
                query_dim = q.len(),
                "index dimension does not match the embedder; rebuild it"
            );
            return Ok(Vec::new());
        }
        let hits = snapshot.search(&q, k)?;
        debug!(k, hits = hits.len(), "search");
        Ok(hits)
    }

    pub fn status(&self) -> bool { self.ensure_loaded() }

    pub fn header(&self) -> Option<IndexHeader> {
        if !self.ensure_loaded() {
            return None;
        }
        self.current_snapshot().map(|s| s.header.clone())
    }

    /// Forget the loaded index and delete the persisted container.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.build_lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.file.remove()?;
        self.install(None);
        info!(path = %self.file.path().display(), "index cleared");
        Ok(())
    }

    fn current_snapshot(&self) -> Option<Arc<IndexSnapshot>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).snapshot.clone()
    }

    fn install(&self, snapshot: Option<Arc<IndexSnapshot>>) {
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        slot.snapshot = snapshot;
        slot.generation += 1;
    }
}
