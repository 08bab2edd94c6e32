//! Query path of the support chat: retrieve, compose, hand off to a generator.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use ragdesk_core::config::RetrievalSettings;
use ragdesk_core::error::Result;
use ragdesk_core::types::Hit;

use crate::context::ContextComposer;
use crate::store::RetrievalStore;

pub const SYSTEM_PROMPT: &str = "You are the support assistant of an online store. \
Answer clearly, kindly and concisely. If you do not know something, say so and refer the customer to a human. \
For any question outside the store's business, answer literally: I do not have that information";

pub const FALLBACK_ANSWER: &str = "No relevant information was found.";

/// The language model behind the assistant.
pub trait Generator: Send + Sync {
    fn generate(&self, system_prompt: &str, query: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub hits: Vec<Hit>,
    pub context: String,
    pub answer: String,
}

pub struct SupportAssistant<G: Generator> {
    store: Arc<RetrievalStore>,
    generator: G,
    composer: ContextComposer,
    top_k: usize,
}

impl<G: Generator> SupportAssistant<G> {
    pub fn new(store: Arc<RetrievalStore>, generator: G, retrieval: &RetrievalSettings) -> Self {
        Self {
            store,
            generator,
            composer: ContextComposer::new(retrieval.max_context_chars),
            top_k: retrieval.top_k,
        }
    }

    pub fn answer(&self, query: &str) -> Result<Answer> {
        let hits = self.store.search(query, self.top_k)?;
        let context = self.composer.compose(&hits);
        let answer = if context.trim().is_empty() {
            debug!("no context for query, using fallback answer");
            FALLBACK_ANSWER.to_string()
        } else {
            let system_prompt = format!("{SYSTEM_PROMPT}\n\nContext:\n{context}");
            self.generator.generate(&system_prompt, query)?.trim().to_string()
        };
        Ok(Answer { query: query.to_string(), hits, context, answer })
    }
}
