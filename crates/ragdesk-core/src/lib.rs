#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod loader;
pub mod traits;
pub mod types;

pub use chunker::{chunk_text, ChunkingConfig};
pub use error::{Error, Result};
pub use types::{Chunk, Hit, Meta};
