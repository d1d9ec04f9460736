// ABOUTME: Document ingestion coordinator: normalize, chunk, embed, entity hints, dual-write, report
// ABOUTME: IngestionCoordinator is the seam the web API's document-upload route depends on

#![warn(missing_debug_implementations)]

mod coordinator;
mod error;
mod hints;
mod normalize;
mod result;

pub use coordinator::{IngestionConfig, IngestionCoordinator};
pub use error::{IngestionError, Result};
pub use hints::{extract_hints, EntityHints};
pub use normalize::{normalize, NormalizedDocument};
pub use result::{BackendOutcome, IngestionResult};

pub mod prelude {
    pub use crate::{IngestionConfig, IngestionCoordinator, IngestionResult};
}
