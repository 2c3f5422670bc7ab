pub mod categories;
pub mod config;
pub mod context;
pub mod error;
pub mod holidays;
pub mod homeless;
pub mod loader;
pub mod schema;
pub mod temporal;
pub mod weights;

pub use config::{PipelineConfig, TimeBucketPolicy};
pub use context::{LoadOutcome, LoadState, PipelineContext};
pub use error::{PipelineError, Result};
pub use weights::{CoordinateWeight, ALL_CATEGORIES};
