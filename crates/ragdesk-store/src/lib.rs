//! Retrieval lifecycle: build, persist, reload and query the document index,
//! plus the administrative and assistant surfaces built on top of it.

pub mod assistant;
pub mod context;
pub mod library;
pub mod store;

pub use assistant::{Answer, Generator, SupportAssistant, FALLBACK_ANSWER, SYSTEM_PROMPT};
pub use context::{compose, ContextComposer, BLOCK_SEPARATOR, DEFAULT_MAX_CHARS};
pub use library::{DocumentLibrary, ReindexReport};
pub use store::{BuildReport, RetrievalStore};
