pub mod clock;
pub mod error;
pub mod formats;
pub mod logging;

pub use clock::{Clock, SystemClock};
#[cfg(test)]
pub use clock::FixedClock;
pub use error::{CodecError, OptimizerError, OptimizerResult, PinError, PinResult};
pub use formats::{OutputFormat, SVG_MIME_TYPE, decoder_format, is_image_mime, is_vector_mime, sniff_mime};
pub use logging::init_tracing;
