//! Symmetric pad-or-crop to a fixed extent.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::image::Image;

/// Value written into voxels added by padding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadFill {
    /// The smallest value present in the image.
    Minimum,
    Constant(f32),
}

impl Default for PadFill {
    fn default() -> Self {
        Self::Minimum
    }
}

/// First input voxel of each output axis; negative when the axis is padded.
///
/// Padding puts `(t - n) / 2` voxels before the data, cropping starts at
/// `n / 2 - t / 2`.
pub fn symmetric_offsets(size: [usize; 3], target: [usize; 3]) -> [isize; 3] {
    let mut offset = [0isize; 3];
    for a in 0..3 {
        let (n, t) = (size[a], target[a]);
        offset[a] = if n < t {
            -(((t - n) / 2) as isize)
        } else {
            (n / 2 - t / 2) as isize
        };
    }
    offset
}

/// Pad or centre-crop each axis so the volume size becomes `target` (`[x, y, z]`).
pub fn resize_with_pad_or_crop<B: Backend>(
    image: &Image<B, 3>,
    target: [usize; 3],
    fill: PadFill,
) -> Result<Image<B, 3>> {
    if target.iter().any(|&t| t == 0) {
        return Err(Error::transform(format!(
            "Target shape {:?} has an empty axis",
            target
        )));
    }

    let size = image.size();
    let offset = symmetric_offsets(size, target);
    let mut src = [0..0, 0..0, 0..0];
    let mut dst = [0..0, 0..0, 0..0];
    for a in 0..3 {
        let s0 = offset[a].max(0);
        let s1 = (offset[a] + target[a] as isize).min(size[a] as isize);
        // reversed: tensor axes are [z, y, x]
        src[2 - a] = s0 as usize..s1 as usize;
        dst[2 - a] = (s0 - offset[a]) as usize..(s1 - offset[a]) as usize;
    }

    let fill_value = match fill {
        PadFill::Minimum => image.min_value(),
        PadFill::Constant(v) => v,
    };
    let device = image.data().device();
    let data = Tensor::<B, 3>::full([target[2], target[1], target[0]], fill_value, &device)
        .slice_assign(dst, image.data().clone().slice(src));
    let metadata = image
        .metadata()
        .shifted([offset[0] as f64, offset[1] as f64, offset[2] as f64]);

    debug!(?size, ?target, ?offset, fill_value, "resized with pad or crop");
    Ok(Image::from_metadata(data, &metadata))
}
