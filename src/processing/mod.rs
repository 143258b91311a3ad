pub mod codec;
mod dimensions;
mod info;
mod optimizer;
mod validation;

pub use codec::{Codec, ImageCodec};
pub use dimensions::calculate_dimensions;
pub use info::{ImageInfo, probe};
pub use optimizer::ImageOptimizer;
pub use validation::{Admission, admit, validate_mime_type, validate_size};
