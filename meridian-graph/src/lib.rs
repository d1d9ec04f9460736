// ABOUTME: Tenant-namespaced bi-temporal knowledge graph adapter
// ABOUTME: GraphStore is the swappable-backend seam; InMemoryGraphStore is the reference implementation

#![warn(missing_debug_implementations)]

mod error;
mod memory;
mod store;
mod types;

pub use error::{GraphError, Result};
pub use memory::InMemoryGraphStore;
pub use store::GraphStore;
pub use types::{
    Edge, EdgeDirection, Entity, Episode, EpisodeRef, Fact, FactEvent, GraphStats, Path,
    Relationship, SearchHit, SearchKind,
};

pub mod prelude {
    pub use crate::{Episode, EpisodeRef, GraphStats, GraphStore, InMemoryGraphStore, Result, SearchKind};
}
