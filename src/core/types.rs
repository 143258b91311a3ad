//! Core types for optimizer settings, inputs and results.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::utils::{OptimizerError, OptimizerResult, OutputFormat};

/// Bytes per megabyte used for the size ceiling.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Bounds and encoding settings for one upload target.
///
/// Immutable once built; construct through [`OptimizerConfig::new`],
/// [`OptimizerConfig::from_json`] or a [`Preset`](crate::Preset) so the
/// values are always validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerConfig {
    /// Maximum output width in pixels
    max_width: u32,
    /// Maximum output height in pixels
    max_height: u32,
    /// Encoder quality in (0, 1]
    quality: f32,
    /// Largest accepted input, in megabytes
    #[serde(rename = "maxSizeMB")]
    max_size_mb: f64,
    /// Encoding applied to optimized output
    #[serde(default)]
    output_format: OutputFormat,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_width: 1200,
            max_height: 800,
            quality: 0.85,
            max_size_mb: 5.0,
            output_format: OutputFormat::Jpeg,
        }
    }
}

impl OptimizerConfig {
    /// Builds a JPEG-producing config, rejecting out-of-range values.
    pub fn new(max_width: u32, max_height: u32, quality: f32, max_size_mb: f64) -> OptimizerResult<Self> {
        let config = Self {
            max_width,
            max_height,
            quality,
            max_size_mb,
            output_format: OutputFormat::Jpeg,
        };
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy encoding to `format` instead.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Parses a camelCase JSON object; missing keys are an error.
    pub fn from_json(json: &str) -> OptimizerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> OptimizerResult<()> {
        if self.max_width == 0 {
            return Err(OptimizerError::config("maxWidth must be greater than 0"));
        }
        if self.max_height == 0 {
            return Err(OptimizerError::config("maxHeight must be greater than 0"));
        }
        if !(self.quality > 0.0 && self.quality <= 1.0) {
            return Err(OptimizerError::config(format!(
                "Invalid quality value: {}. Must be in (0, 1]",
                self.quality
            )));
        }
        if !(self.max_size_mb.is_finite() && self.max_size_mb > 0.0) {
            return Err(OptimizerError::config(format!(
                "Invalid maxSizeMB value: {}. Must be a positive number",
                self.max_size_mb
            )));
        }
        Ok(())
    }

    pub fn max_width(&self) -> u32 {
        self.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn max_size_mb(&self) -> f64 {
        self.max_size_mb
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Size ceiling in bytes (`maxSizeMB * 1_048_576`).
    pub fn max_size_bytes(&self) -> f64 {
        self.max_size_mb * BYTES_PER_MB
    }
}

/// Pixel size of an image or raster surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn fits_within(&self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// A file selected for upload.
///
/// The optimizer only reads it; the byte buffer is shared, so a pass-through
/// result points at the very same allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub name: String,
    pub mime_type: String,
    pub data: Arc<[u8]>,
    pub last_modified_ms: i64,
}

impl SourceImage {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        data: impl Into<Arc<[u8]>>,
        last_modified_ms: i64,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: data.into(),
            last_modified_ms,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// How an [`OptimizedImage`] came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OptimizationOutcome {
    /// Decoded, possibly resized, and encoded to the target format
    Reencoded,
    /// Vector input returned untouched
    PassedThrough,
    /// Re-encoding would have grown an already-compliant file, so the source bytes were kept
    KeptOriginal,
}

/// Result of an optimization, ready to replace the selected file.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizedImage {
    pub name: String,
    pub mime_type: String,
    pub data: Arc<[u8]>,
    pub last_modified_ms: i64,
    /// Source file size in bytes
    pub original_size: u64,
    /// Output pixel size, unknown for pass-through
    pub dimensions: Option<Dimensions>,
    pub outcome: OptimizationOutcome,
}

impl OptimizedImage {
    /// Wraps the source unchanged.
    pub fn passthrough(source: &SourceImage) -> Self {
        Self {
            name: source.name.clone(),
            mime_type: source.mime_type.clone(),
            data: Arc::clone(&source.data),
            last_modified_ms: source.last_modified_ms,
            original_size: source.size_bytes(),
            dimensions: None,
            outcome: OptimizationOutcome::PassedThrough,
        }
    }

    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }

    /// Bytes saved (can be negative if file grew)
    pub fn saved_bytes(&self) -> i64 {
        self.original_size as i64 - self.size_bytes() as i64
    }

    /// Saved bytes as a percentage of the original size
    pub fn compression_ratio(&self) -> f64 {
        if self.original_size > 0 {
            self.saved_bytes() as f64 / self.original_size as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Serializable summary for a presentation layer.
    pub fn summary(&self) -> OptimizationSummary {
        OptimizationSummary {
            name: self.name.clone(),
            mime_type: self.mime_type.clone(),
            original_size: self.original_size,
            optimized_size: self.size_bytes(),
            saved_bytes: self.saved_bytes(),
            compression_ratio: self.compression_ratio(),
            dimensions: self.dimensions,
            outcome: self.outcome,
        }
    }
}

/// Size statistics of one optimization, without the payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationSummary {
    pub name: String,
    pub mime_type: String,
    pub original_size: u64,
    pub optimized_size: u64,
    pub saved_bytes: i64,
    pub compression_ratio: f64,
    pub dimensions: Option<Dimensions>,
    pub outcome: OptimizationOutcome,
}
