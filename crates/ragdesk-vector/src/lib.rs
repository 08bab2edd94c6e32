pub mod flat;
pub mod persist;

pub use flat::FlatIndex;
pub use persist::{IndexFile, IndexHeader, IndexPayload, FORMAT_VERSION, INDEX_FILE_NAME};
