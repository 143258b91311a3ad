//! Bounding-box downscale arithmetic.

use crate::core::{Dimensions, OptimizerConfig};
use crate::utils::{OptimizerError, OptimizerResult};

/// Computes the output size for an image of `natural` size under `config`.
///
/// Images already inside both bounds are returned unchanged; nothing is ever
/// upscaled. Otherwise the tighter of the two ratios scales both sides, so
/// the aspect ratio is kept and both bounds hold at once. Sides are rounded
/// to the nearest pixel and never drop below 1 px.
///
/// A zero natural side is rejected with
/// [`OptimizerError::InvalidImageDimensions`].
pub fn calculate_dimensions(natural: Dimensions, config: &OptimizerConfig) -> OptimizerResult<Dimensions> {
    if natural.width == 0 || natural.height == 0 {
        return Err(OptimizerError::InvalidImageDimensions {
            width: natural.width,
            height: natural.height,
        });
    }

    if natural.fits_within(config.max_width(), config.max_height()) {
        return Ok(natural);
    }

    let scale = scale_factor(natural, config.max_width(), config.max_height());
    Ok(apply_scale(natural, scale))
}

/// Tighter of the two bound ratios. Only called when a bound is exceeded,
/// so the result is below 1.
fn scale_factor(natural: Dimensions, max_width: u32, max_height: u32) -> f64 {
    let width_ratio = max_width as f64 / natural.width as f64;
    let height_ratio = max_height as f64 / natural.height as f64;
    width_ratio.min(height_ratio)
}

fn apply_scale(natural: Dimensions, scale: f64) -> Dimensions {
    let width = (natural.width as f64 * scale).round() as u32;
    let height = (natural.height as f64 * scale).round() as u32;

    Dimensions::new(width.max(1), height.max(1))
}
