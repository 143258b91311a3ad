//! Pre-upload image optimization and team PIN autofill.
//!
//! [`ImageOptimizer`] validates a selected file, downscales it into the
//! configured bounding box and re-encodes it, so uploads stay small. The
//! [`pin`] module remembers the team PIN and fills it into PIN inputs.

pub mod core;
pub mod pin;
pub mod processing;
pub mod utils;

// Public exports for external consumers
pub use crate::core::{
    Dimensions, OptimizationOutcome, OptimizationSummary, OptimizedImage, OptimizerConfig, Preset,
    ProgressReader, SourceImage, UploadProgress,
};
pub use processing::{Codec, ImageCodec, ImageInfo, ImageOptimizer, probe};
pub use utils::{CodecError, OptimizerError, OptimizerResult, OutputFormat, PinError, PinResult, init_tracing};
