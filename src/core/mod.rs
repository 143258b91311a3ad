//! Core optimizer types.
//!
//! - [`OptimizerConfig`]: bounds, quality and size ceiling for one upload target
//! - [`Preset`]: the named configurations used by the team pages
//! - [`SourceImage`] / [`OptimizedImage`]: input and output of an optimization
//! - [`ProgressReader`]: upload progress based on bytes actually sent

mod presets;
mod progress;
mod types;

pub use presets::Preset;
pub use progress::{ProgressReader, ProgressStatus, UploadProgress};
pub use types::{
    BYTES_PER_MB, Dimensions, OptimizationOutcome, OptimizationSummary, OptimizedImage,
    OptimizerConfig, SourceImage,
};
