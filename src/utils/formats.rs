use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::utils::OptimizerError;

/// MIME type of resolution-independent vector images, which are never re-encoded.
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

const IMAGE_MIME_PREFIX: &str = "image/";

/// Encoding applied to every optimized image of a given config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    /// Content type stamped on optimized output
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Get the primary extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }

    /// Whether the quality factor influences the encoder
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::Jpeg)
    }
}

impl FromStr for OutputFormat {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "jpg" | "jpeg" | "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "png" | "image/png" => Ok(Self::Png),
            _ => Err(OptimizerError::config(format!("Unsupported output format: {s}"))),
        }
    }
}

/// Returns `true` when the declared MIME type belongs to the image category.
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type
        .get(..IMAGE_MIME_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(IMAGE_MIME_PREFIX))
}

/// Returns `true` for vector images that bypass the pipeline.
pub fn is_vector_mime(mime_type: &str) -> bool {
    mime_type.trim().eq_ignore_ascii_case(SVG_MIME_TYPE)
}

/// Maps a declared MIME type to the decoder format, when `image` knows it.
pub fn decoder_format(mime_type: &str) -> Option<image::ImageFormat> {
    image::ImageFormat::from_mime_type(mime_type.trim().to_lowercase())
}

/// MIME type of the container the bytes actually hold, judged by their magic number.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    image::guess_format(bytes).ok().map(|format| format.to_mime_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_by_magic_number() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"\x89PNG\r\n\x1a\n\0\0"), Some("image/png"));
        assert_eq!(sniff_mime(b"<svg/>"), None);
    }

    #[test]
    fn image_category_is_prefix_based() {
        assert!(is_image_mime("image/png"));
        assert!(is_image_mime("IMAGE/HEIC"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime("img"));
        assert!(!is_image_mime(""));
    }

    #[test]
    fn vector_detection() {
        assert!(is_vector_mime("image/svg+xml"));
        assert!(is_vector_mime("Image/SVG+XML"));
        assert!(!is_vector_mime("image/svg"));
    }

    #[test]
    fn output_format_parsing() {
        assert_eq!("JPG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("image/png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert!("webp".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn decoder_format_from_mime() {
        assert_eq!(decoder_format("image/png"), Some(image::ImageFormat::Png));
        assert_eq!(decoder_format("image/x-unknown"), None);
    }
}
