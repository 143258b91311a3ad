//! Header-only inspection of an image for preview captions.

use std::io::Cursor;
use image::metadata::Orientation;
use image::{ImageDecoder, ImageReader};
use serde::Serialize;
use crate::core::BYTES_PER_MB;
use crate::utils::{OptimizerError, OptimizerResult};

/// Basic facts about an image file, read without decoding its pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Container format as detected from the bytes, e.g. `"Png"`
    pub format: String,
    pub size_bytes: u64,
    /// Size in megabytes, rounded to two decimals
    pub size_mb: f64,
}

/// Reads upright dimensions and container format from the image header.
pub fn probe(bytes: &[u8]) -> OptimizerResult<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| OptimizerError::decode(format!("cannot read image header: {e}")))?;

    let format = reader
        .format()
        .ok_or_else(|| OptimizerError::decode("unrecognised image format"))?;

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| OptimizerError::decode(e.to_string()))?;
    let (stored_width, stored_height) = decoder.dimensions();

    // Quarter turns swap the sides a viewer sees
    let (width, height) = match decoder.orientation().unwrap_or(Orientation::NoTransforms) {
        Orientation::Rotate90
        | Orientation::Rotate270
        | Orientation::Rotate90FlipH
        | Orientation::Rotate270FlipH => (stored_height, stored_width),
        _ => (stored_width, stored_height),
    };

    let size_bytes = bytes.len() as u64;
    Ok(ImageInfo {
        width,
        height,
        format: format!("{format:?}"),
        size_bytes,
        size_mb: (size_bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0,
    })
}
