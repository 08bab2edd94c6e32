use std::sync::{Arc, Mutex};

use ragdesk_core::config::RetrievalSettings;
use ragdesk_core::types::Chunk;
use ragdesk_embed::{EmbeddingClient, HashEmbedder};
use ragdesk_store::{Generator, RetrievalStore, SupportAssistant, FALLBACK_ANSWER, SYSTEM_PROMPT};

type Calls = Arc<Mutex<Vec<(String, String)>>>;

#[derive(Default)]
struct Recorder {
    calls: Calls,
}

impl Generator for Recorder {
    fn generate(&self, system_prompt: &str, query: &str) -> anyhow::Result<String> {
        self.calls.lock().expect("lock").push((system_prompt.to_string(), query.to_string()));
        Ok("  We open at 9am.  ".to_string())
    }
}

struct Failing;

impl Generator for Failing {
    fn generate(&self, _system_prompt: &str, _query: &str) -> anyhow::Result<String> {
        anyhow::bail!("model offline")
    }
}

fn store(root: &std::path::Path) -> Arc<RetrievalStore> {
    Arc::new(RetrievalStore::new(EmbeddingClient::new(Arc::new(HashEmbedder::default())), root))
}

#[test]
fn answers_with_retrieved_context() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = store(tmp.path());
    store
        .build_index(vec![
            Chunk::from_document("faq.txt", 0, "The store opens at 9am"),
            Chunk::from_document("faq.txt", 1, "Returns accepted within 30 days"),
        ])
        .expect("build");

    let recorder = Recorder::default();
    let calls = Arc::clone(&recorder.calls);
    let assistant = SupportAssistant::new(store, recorder, &RetrievalSettings::default());
    let answer = assistant.answer("What time do you open?").expect("answer");

    assert_eq!(answer.answer, "We open at 9am.");
    assert_eq!(answer.hits[0].source, "faq.txt#0");
    assert!(answer.context.starts_with("[faq.txt] The store opens at 9am"));

    let calls = calls.lock().expect("lock");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, format!("{SYSTEM_PROMPT}\n\nContext:\n{}", answer.context));
    assert_eq!(calls[0].1, "What time do you open?");
}

#[test]
fn no_index_means_fallback_without_generation() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let recorder = Recorder::default();
    let calls = Arc::clone(&recorder.calls);
    let assistant = SupportAssistant::new(store(tmp.path()), recorder, &RetrievalSettings::default());
    let answer = assistant.answer("Do you ship abroad?").expect("answer");
    assert_eq!(answer.answer, FALLBACK_ANSWER);
    assert!(answer.hits.is_empty());
    assert!(answer.context.is_empty());
    assert!(calls.lock().expect("lock").is_empty());
}

#[test]
fn generator_failures_propagate() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = store(tmp.path());
    store.build_index(vec![Chunk::new("The store opens at 9am", "faq.txt#0")]).expect("build");
    let assistant = SupportAssistant::new(store, Failing, &RetrievalSettings::default());
    let err = assistant.answer("open?").expect_err("should fail");
    assert!(err.to_string().contains("model offline"));
}
