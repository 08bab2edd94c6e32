//! Deterministic hashing embedder.
//!
//! Words and their padded character trigrams (`<op`, `ope`, `pen`, `en>`) are
//! hashed with xxHash64 into a fixed number of buckets; one hash bit picks the
//! sign so unrelated collisions cancel out on average. Texts that share words
//! or word stems end up with a high cosine similarity, which is all the tests
//! and offline development need.

use std::hash::Hasher;

use twox_hash::XxHash64;

use ragdesk_core::traits::Embedder;

pub const DEFAULT_HASH_DIM: usize = 1024;

pub struct HashEmbedder {
    dim: usize,
    id: String,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        let dim = dim.max(1);
        Self { dim, id: format!("hash:xxh64:d{dim}") }
    }

    pub fn dim(&self) -> usize { self.dim }

    /// Unnormalised feature vector for one text.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for feature in features(text) {
            let mut hasher = XxHash64::with_seed(0);
            hasher.write(feature.as_bytes());
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 1 { -1.0 } else { 1.0 };
            v[idx] += sign;
        }
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self { Self::new(DEFAULT_HASH_DIM) }
}

impl Embedder for HashEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

fn features(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut out = Vec::new();
    for token in lower.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        out.push(format!("w:{token}"));
        let padded: Vec<char> = std::iter::once('<').chain(token.chars()).chain(std::iter::once('>')).collect();
        for gram in padded.windows(3) {
            out.push(gram.iter().collect());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_include_words_and_padded_trigrams() {
        let f = features("Open!");
        assert_eq!(f, vec!["w:open", "<op", "ope", "pen", "en>"]);
    }

    #[test]
    fn single_letter_token_still_has_a_trigram() {
        assert_eq!(features("a"), vec!["w:a", "<a>"]);
    }
}
