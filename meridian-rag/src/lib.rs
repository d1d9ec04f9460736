// ABOUTME: Tenant-filtered vector store adapter: k-NN + hybrid lexical search, chunking
// ABOUTME: VectorStorage is the swappable-backend seam; InMemoryVectorStore is the reference implementation

#![warn(missing_debug_implementations)]

mod chunking;
mod error;
mod memory;
mod store;
mod types;

pub use chunking::{chunk_fixed_size, ChunkingConfig, TextChunk};
pub use error::{RagError, Result};
pub use memory::InMemoryVectorStore;
pub use store::VectorStorage;
pub use types::{Chunk, Document, Hit, VectorStoreStats};

pub mod prelude {
    pub use crate::{Chunk, Document, Hit, InMemoryVectorStore, Result, VectorStorage};
}
