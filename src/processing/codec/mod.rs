//! Pixel decode, draw and encode as an injected capability.
//!
//! The optimizer only orchestrates; everything that touches pixels goes
//! through a [`Codec`]. [`ImageCodec`] is the native implementation, tests
//! swap in fakes.

mod native;

use std::sync::Arc;
use async_trait::async_trait;
use crate::core::Dimensions;
use crate::utils::{CodecError, OutputFormat};

pub use native::ImageCodec;

/// Decoder, resampler and encoder for one raster representation.
///
/// Every method consumes or produces an owned raster, so intermediate
/// surfaces are released as soon as the next stage takes over.
#[async_trait]
pub trait Codec: Send + Sync + 'static {
    /// Decoded, pixel-addressable image.
    type Raster: Send + 'static;

    /// Decodes `bytes` declared as `mime_type`.
    async fn decode(&self, bytes: Arc<[u8]>, mime_type: &str) -> Result<Self::Raster, CodecError>;

    /// Natural pixel size of a decoded raster.
    fn dimensions(&self, raster: &Self::Raster) -> Dimensions;

    /// Draws `raster` onto a fresh surface of `target` size.
    async fn draw(&self, raster: Self::Raster, target: Dimensions) -> Result<Self::Raster, CodecError>;

    /// Encodes `raster` as `format`; `quality` is in (0, 1].
    async fn encode(
        &self,
        raster: Self::Raster,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, CodecError>;
}
