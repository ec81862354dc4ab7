//! Foreground cropping.

use burn::tensor::backend::Backend;
use tracing::{debug, warn};

use crate::error::Result;
use crate::image::Image;

/// Bounding box of non-zero voxels as `(lower, upper)` in index order `[x, y, z]`.
///
/// `lower` is inclusive, `upper` exclusive. `None` when every voxel is zero.
pub fn foreground_bounds<B: Backend>(image: &Image<B, 3>) -> Result<Option<([usize; 3], [usize; 3])>> {
    let [nx, ny, _] = image.size();
    let voxels = image.to_voxels()?;

    let mut lower = [usize::MAX; 3];
    let mut upper = [0usize; 3];
    let mut found = false;
    for (flat, &v) in voxels.iter().enumerate() {
        if v == 0.0 {
            continue;
        }
        found = true;
        let index = [flat % nx, (flat / nx) % ny, flat / (nx * ny)];
        for a in 0..3 {
            lower[a] = lower[a].min(index[a]);
            upper[a] = upper[a].max(index[a] + 1);
        }
    }
    Ok(found.then_some((lower, upper)))
}

/// Crop a volume to the bounding box of its own non-zero voxels.
///
/// The box is widened by `margin` voxels on each side, clamped to the image.
/// A volume without foreground is returned unchanged.
pub fn crop_foreground<B: Backend>(image: &Image<B, 3>, margin: usize) -> Result<Image<B, 3>> {
    let size = image.size();
    let Some((lower, upper)) = foreground_bounds(image)? else {
        warn!(?size, "no foreground voxels, skipping crop");
        return Ok(image.clone());
    };

    let mut start = [0usize; 3];
    let mut end = [0usize; 3];
    for a in 0..3 {
        start[a] = lower[a].saturating_sub(margin);
        end[a] = (upper[a] + margin).min(size[a]);
    }

    let data = image
        .data()
        .clone()
        .slice([start[2]..end[2], start[1]..end[1], start[0]..end[0]]);
    let metadata = image
        .metadata()
        .shifted([start[0] as f64, start[1] as f64, start[2] as f64]);

    debug!(?size, ?start, ?end, "cropped to foreground");
    Ok(Image::from_metadata(data, &metadata))
}
