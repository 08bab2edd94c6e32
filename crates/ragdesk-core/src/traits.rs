/// A source of raw embeddings (remote API, local model, test double).
///
/// Implementations return one vector per input in input order. Normalisation
/// and dimension checks happen in `ragdesk_embed::EmbeddingClient`, so raw
/// providers may hand back unnormalised vectors.
pub trait Embedder: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `openai:text-embedding-3-small`).
    fn embedder_id(&self) -> &str;
    /// Compute embeddings for a batch of input texts.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}
