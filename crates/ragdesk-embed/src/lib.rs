//! Embedding capability for the retrieval pipeline.
//!
//! [`EmbeddingClient`] wraps whichever [`Embedder`] was resolved at startup and
//! guarantees its callers one unit-norm vector per input, in input order, all
//! with the same dimension. When no provider could be resolved the client is
//! still constructed, and every call fails with [`Error::Configuration`].

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use ragdesk_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use ragdesk_core::error::{Error, Result};
pub use ragdesk_core::traits::Embedder;

mod hash;
mod normalize;
mod openai;

pub use hash::{HashEmbedder, DEFAULT_HASH_DIM};
pub use normalize::{l2_norm, normalize_l2, NORM_EPS};
pub use openai::OpenAiEmbedder;

const MISSING_PROVIDER: &str =
    "no embedding provider configured (set APP_EMBEDDING__API_KEY or OPENAI_API_KEY)";
const DEFAULT_BATCH_SIZE: usize = 64;

#[derive(Clone)]
pub struct EmbeddingClient {
    provider: Option<Arc<dyn Embedder>>,
    batch_size: usize,
    show_progress: bool,
}

impl EmbeddingClient {
    pub fn new(provider: Arc<dyn Embedder>) -> Self {
        Self { provider: Some(provider), batch_size: DEFAULT_BATCH_SIZE, show_progress: false }
    }

    /// A client without a provider; every `embed` fails with a configuration error.
    pub fn unconfigured() -> Self {
        Self { provider: None, batch_size: DEFAULT_BATCH_SIZE, show_progress: false }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Resolve the provider once, at startup.
    ///
    /// A missing API key is not an error here: the client comes back
    /// unconfigured so the host can still start, and the failure surfaces on
    /// first use. Settings that are present but invalid are rejected.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let client = match settings.provider {
            EmbeddingProviderKind::Hash => {
                if settings.hash_dim == 0 {
                    return Err(Error::Configuration("embedding.hash_dim must be positive".into()));
                }
                Self::new(Arc::new(HashEmbedder::new(settings.hash_dim)))
            }
            EmbeddingProviderKind::OpenAi => match settings.api_key.as_deref().map(str::trim) {
                Some(key) if !key.is_empty() => {
                    if settings.timeout_secs == 0 {
                        return Err(Error::Configuration("embedding.timeout_secs must be positive".into()));
                    }
                    let provider = OpenAiEmbedder::new(
                        key,
                        &settings.base_url,
                        &settings.model,
                        Duration::from_secs(settings.timeout_secs),
                    )
                    .map_err(|e| Error::Configuration(format!("{e:#}")))?;
                    Self::new(Arc::new(provider))
                }
                _ => {
                    warn!("{MISSING_PROVIDER}; retrieval will be unavailable");
                    Self::unconfigured()
                }
            },
        };
        if let Some(id) = client.embedder_id() {
            info!(embedder = id, "embedding provider ready");
        }
        Ok(client.with_batch_size(settings.batch_size).with_progress(settings.show_progress))
    }

    pub fn is_configured(&self) -> bool { self.provider.is_some() }

    pub fn embedder_id(&self) -> Option<&str> { self.provider.as_deref().map(|p| p.embedder_id()) }

    /// One unit-norm vector per input, same order, same dimension.
    pub fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let provider = self.provider.as_ref().ok_or_else(|| Error::Configuration(MISSING_PROVIDER.into()))?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let pb = if self.show_progress {
            let pb = ProgressBar::new(texts.len() as u64);
            let style = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} texts ({percent}%)")
                .map(|s| s.progress_chars("#>-"))
                .unwrap_or_else(|_| ProgressStyle::default_bar());
            pb.set_style(style);
            pb
        } else {
            ProgressBar::hidden()
        };

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            let raw = provider
                .embed_batch(batch)
                .map_err(|e| Error::Embedding(format!("{}: {e:#}", provider.embedder_id())))?;
            if raw.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "{} returned {} vectors for {} inputs",
                    provider.embedder_id(),
                    raw.len(),
                    batch.len()
                )));
            }
            for mut v in raw {
                normalize_l2(&mut v);
                vectors.push(v);
            }
            pb.inc(batch.len() as u64);
        }
        pb.finish_and_clear();

        let dim = vectors[0].len();
        if dim == 0 {
            return Err(Error::Embedding(format!("{} returned empty vectors", provider.embedder_id())));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
            return Err(Error::Embedding(format!(
                "{} returned vectors of dimension {dim} and {}",
                provider.embedder_id(),
                bad.len()
            )));
        }
        debug!(count = vectors.len(), dim, "embedded texts");
        Ok(vectors)
    }

    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()])?;
        vectors.pop().ok_or_else(|| Error::Embedding("provider returned no vector".into()))
    }
}
