// ABOUTME: Shared error, scoping, and type foundations for every meridian crate
// ABOUTME: No I/O lives here; this crate is pure types/traits so it compiles fast and mocks easily

#![warn(missing_debug_implementations)]

pub mod error;
pub mod state;
pub mod traits;
pub mod types;

pub mod prelude {
    pub use crate::error::{MeridianError, Result};
    pub use crate::state::TenantScope;
    pub use crate::traits::TenantScoped;
    pub use crate::types::{Citation, CitationKind, Confidence, Embedding, EmbeddingDim};
}
