//! Native codec built on `image` for decode/encode and `fast_image_resize` for resampling.
//!
//! Each stage runs inside `tokio::task::spawn_blocking` so the async runtime
//! is never blocked by pixel work.

use std::io::Cursor;
use std::sync::Arc;
use async_trait::async_trait;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::codecs::jpeg::JpegEncoder;
use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageReader, RgbImage, RgbaImage};
use tracing::debug;

use crate::core::Dimensions;
use crate::utils::{CodecError, OutputFormat, decoder_format};

use super::Codec;

/// Codec backed by the `image` crate, resampling with Lanczos3.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCodec;

impl ImageCodec {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Codec for ImageCodec {
    type Raster = DynamicImage;

    async fn decode(&self, bytes: Arc<[u8]>, mime_type: &str) -> Result<DynamicImage, CodecError> {
        let declared = decoder_format(mime_type);
        run_blocking("decode", move || decode_bytes(&bytes, declared)).await
    }

    fn dimensions(&self, raster: &DynamicImage) -> Dimensions {
        Dimensions::new(raster.width(), raster.height())
    }

    async fn draw(&self, raster: DynamicImage, target: Dimensions) -> Result<DynamicImage, CodecError> {
        run_blocking("draw", move || resample(raster, target)).await
    }

    async fn encode(
        &self,
        raster: DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, CodecError> {
        run_blocking("encode", move || encode_raster(&raster, format, quality)).await
    }
}

// ── Blocking stages (run on tokio's blocking thread pool) ────────────────────────────

async fn run_blocking<T, F>(stage: &'static str, work: F) -> Result<T, CodecError>
where
    F: FnOnce() -> Result<T, CodecError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CodecError::Host(format!("{stage} task failed: {e}")))?
}

/// Sniffs the container from the bytes, falling back to the declared type.
///
/// The EXIF orientation is applied, so the raster comes out upright with the
/// dimensions a viewer would show.
fn decode_bytes(bytes: &[u8], declared: Option<image::ImageFormat>) -> Result<DynamicImage, CodecError> {
    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CodecError::Decode(format!("cannot read image header: {e}")))?;

    if reader.format().is_none() {
        if let Some(format) = declared {
            reader.set_format(format);
        }
    }

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    // Unreadable metadata is not worth failing the upload over
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| CodecError::Decode(e.to_string()))?;
    if orientation != Orientation::NoTransforms {
        debug!("Applying EXIF orientation {:?}", orientation);
        image.apply_orientation(orientation);
    }

    debug!("Decoded {}×{} ({:?})", image.width(), image.height(), image.color());
    Ok(image)
}

fn resample(image: DynamicImage, target: Dimensions) -> Result<DynamicImage, CodecError> {
    if image.width() == target.width && image.height() == target.height {
        return Ok(image);
    }

    let has_alpha = image.color().has_alpha();
    let (width, height) = (image.width(), image.height());
    let (buffer, pixel_type) = if has_alpha {
        (image.into_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (image.into_rgb8().into_raw(), PixelType::U8x3)
    };

    let src = Image::from_vec_u8(width, height, buffer, pixel_type)
        .map_err(|e| CodecError::Draw(format!("failed to create source image: {e}")))?;
    let mut dst = Image::new(target.width, target.height, pixel_type);

    let mut resizer = Resizer::new();
    resizer
        .resize(
            &src,
            &mut dst,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )
        .map_err(|e| CodecError::Draw(format!("resize failed: {e}")))?;

    let raw = dst.into_vec();
    let resized = if has_alpha {
        RgbaImage::from_raw(target.width, target.height, raw).map(DynamicImage::ImageRgba8)
    } else {
        RgbImage::from_raw(target.width, target.height, raw).map(DynamicImage::ImageRgb8)
    };

    debug!("Resampled {width}×{height} → {target}");
    resized.ok_or_else(|| CodecError::Draw("failed to convert resized image".to_string()))
}

fn encode_raster(image: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());

    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality(quality));
            flatten_onto_white(image)
                .write_with_encoder(encoder)
                .map_err(|e| CodecError::Encode(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Png => {
            image
                .write_to(&mut buf, image::ImageFormat::Png)
                .map_err(|e| CodecError::Encode(format!("PNG encode failed: {e}")))?;
        }
    }

    let bytes = buf.into_inner();
    if bytes.is_empty() {
        return Err(CodecError::EmptyOutput);
    }

    debug!(
        "Encoded {} bytes as {:?}{}",
        bytes.len(),
        format,
        if format.is_lossy() { format!(" at quality {quality}") } else { String::new() }
    );
    Ok(bytes)
}

/// Maps a (0, 1] quality factor to the encoder's 1–100 scale.
fn jpeg_quality(quality: f32) -> u8 {
    ((quality * 100.0).round() as i32).clamp(1, 100) as u8
}

/// JPEG has no alpha channel; transparent areas become white.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src.0[3] as u32;
        for c in 0..3 {
            dst.0[c] = ((src.0[c] as u32 * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        }
    }
    out
}
