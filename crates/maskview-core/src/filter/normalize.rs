//! Geometry normalization: reorient, resample, crop, pad.

use burn::tensor::backend::Backend;
use tracing::debug;

use super::crop::crop_foreground;
use super::pad::resize_with_pad_or_crop;
use super::resample::resample_to_spacing;
use crate::config::GeometryConfig;
use crate::error::Result;
use crate::image::Image;
use crate::orientation::reorient;

/// Run the full normalization chain on one volume.
///
/// Stages run in a fixed order and the first failure aborts the chain, so a
/// caller never sees a partially normalized image. `name` only tags log output.
pub fn normalize<B: Backend>(
    name: &str,
    image: &Image<B, 3>,
    config: &GeometryConfig,
) -> Result<Image<B, 3>> {
    let reoriented = reorient(image, config.orientation)?;
    debug!(name, size = ?reoriented.size(), "reoriented");

    let resampled = resample_to_spacing(&reoriented, config.target_spacing())?;
    debug!(name, size = ?resampled.size(), "resampled");

    let cropped = crop_foreground(&resampled, config.crop_margin)?;
    debug!(name, size = ?cropped.size(), "cropped");

    resize_with_pad_or_crop(&cropped, config.target_shape, config.pad_fill)
}
