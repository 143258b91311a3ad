use tracing::debug;
use crate::core::{OptimizerConfig, SourceImage};
use crate::utils::{OptimizerError, OptimizerResult, is_image_mime, is_vector_mime};

/// What the optimizer should do with a source that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Run the decode/resize/encode pipeline
    Process,
    /// Return the source untouched (vector formats)
    PassThrough,
}

/// Validates a source against `config` before any decode work.
///
/// Checks run in a fixed order: size ceiling, image category, vector bypass.
pub fn admit(source: &SourceImage, config: &OptimizerConfig) -> OptimizerResult<Admission> {
    validate_size(source, config)?;
    validate_mime_type(&source.mime_type)?;

    if is_vector_mime(&source.mime_type) {
        debug!("'{}' is a vector image, skipping optimization", source.name);
        return Ok(Admission::PassThrough);
    }

    Ok(Admission::Process)
}

/// Rejects sources above `maxSizeMB * 1_048_576` bytes.
pub fn validate_size(source: &SourceImage, config: &OptimizerConfig) -> OptimizerResult<()> {
    let size = source.size_bytes();
    let ceiling = config.max_size_bytes();

    if size as f64 > ceiling {
        return Err(OptimizerError::file_too_large(size, ceiling.floor() as u64, config.max_size_mb()));
    }
    Ok(())
}

/// Rejects declared types outside `image/*`.
pub fn validate_mime_type(mime_type: &str) -> OptimizerResult<()> {
    if !is_image_mime(mime_type) {
        return Err(OptimizerError::not_an_image(mime_type));
    }
    Ok(())
}
