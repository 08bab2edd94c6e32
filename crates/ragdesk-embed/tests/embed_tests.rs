use std::sync::Arc;

use ragdesk_core::config::{EmbeddingProviderKind, EmbeddingSettings};
use ragdesk_core::Error;
use ragdesk_embed::{l2_norm, Embedder, EmbeddingClient, HashEmbedder};

fn hash_client() -> EmbeddingClient { EmbeddingClient::new(Arc::new(HashEmbedder::default())) }

fn dot(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[test]
fn unconfigured_client_fails_even_for_empty_input() {
    let client = EmbeddingClient::unconfigured();
    assert!(!client.is_configured());
    assert!(client.embedder_id().is_none());
    assert!(matches!(client.embed(&[]), Err(Error::Configuration(_))));
    assert!(matches!(client.embed_one("hello"), Err(Error::Configuration(_))));
}

#[test]
fn empty_input_gives_empty_output() {
    let out = hash_client().embed(&[]).expect("embed");
    assert!(out.is_empty());
}

#[test]
fn vectors_are_unit_norm_with_equal_dims() {
    let texts: Vec<String> = ["hello world", "the store opens at 9am", "x"].iter().map(|s| s.to_string()).collect();
    let out = hash_client().with_batch_size(2).embed(&texts).expect("embed");
    assert_eq!(out.len(), 3);
    for v in &out {
        assert_eq!(v.len(), 1024);
        let norm = l2_norm(v);
        assert!((norm - 1.0).abs() <= 1e-3, "norm={norm}");
    }
}

#[test]
fn blank_text_yields_zero_vector_not_nan() {
    let out = hash_client().embed(&["   ".to_string()]).expect("embed");
    assert!(out[0].iter().all(|x| *x == 0.0));
}

#[test]
fn hash_embeddings_are_deterministic() {
    let a = hash_client().embed_one("Returns accepted within 30 days").expect("a");
    let b = hash_client().embed_one("Returns accepted within 30 days").expect("b");
    assert_eq!(a, b);
}

#[test]
fn shared_word_stems_score_higher() {
    let client = hash_client();
    let q = client.embed_one("What time do you open?").expect("q");
    let hours = client.embed_one("The store opens at 9am").expect("hours");
    let returns = client.embed_one("Returns accepted within 30 days").expect("returns");
    assert!(dot(&q, &hours) > dot(&q, &returns));
}

#[test]
fn from_settings_resolves_providers() {
    let mut settings = EmbeddingSettings { provider: EmbeddingProviderKind::Hash, hash_dim: 64, ..Default::default() };
    let client = EmbeddingClient::from_settings(&settings).expect("hash");
    assert_eq!(client.embedder_id(), Some("hash:xxh64:d64"));

    settings.hash_dim = 0;
    assert!(matches!(EmbeddingClient::from_settings(&settings), Err(Error::Configuration(_))));

    let settings = EmbeddingSettings { provider: EmbeddingProviderKind::OpenAi, api_key: None, ..Default::default() };
    let client = EmbeddingClient::from_settings(&settings).expect("no key is not fatal at startup");
    assert!(!client.is_configured());

    let settings = EmbeddingSettings { api_key: Some("sk-test".into()), ..Default::default() };
    let client = EmbeddingClient::from_settings(&settings).expect("openai");
    assert_eq!(client.embedder_id(), Some("openai:text-embedding-3-small"));
}

struct Ragged;

impl Embedder for Ragged {
    fn embedder_id(&self) -> &str { "ragged" }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| vec![1.0; t.len().max(1)]).collect())
    }
}

struct Short;

impl Embedder for Short {
    fn embedder_id(&self) -> &str { "short" }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> { Ok(vec![vec![1.0]]) }
}

#[test]
fn provider_contract_violations_are_errors() {
    let ragged = EmbeddingClient::new(Arc::new(Ragged));
    let texts = vec!["a".to_string(), "abc".to_string()];
    let err = ragged.embed(&texts).expect_err("ragged");
    assert!(matches!(err, Error::Embedding(_)));
    assert!(err.to_string().contains("dimension 1 and 3"));

    let short = EmbeddingClient::new(Arc::new(Short));
    assert!(matches!(short.embed(&texts), Err(Error::Embedding(_))));
}
