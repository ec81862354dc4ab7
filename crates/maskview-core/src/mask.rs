//! Label masks, voxel coordinates and bounded random sampling.

use burn::tensor::backend::Backend;
use ndarray::Array3;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{Error, Result};
use crate::image::Image;

/// Voxel index in index order `[x, y, z]` (NIfTI `i, j, k`).
pub type VoxelIndex = [usize; 3];

/// Binary mask of the voxels whose label is in a fixed set.
///
/// Stored with the tensor layout of its source image, `[Z, Y, X]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMask {
    data: Array3<bool>,
}

impl LabelMask {
    /// Membership test of every voxel against `labels`.
    pub fn from_image<B: Backend>(image: &Image<B, 3>, labels: &[i32]) -> Result<Self> {
        let labels: Vec<f32> = labels.iter().map(|&l| l as f32).collect();
        let voxels = image
            .to_voxels()?
            .into_iter()
            .map(|v| labels.contains(&v))
            .collect();
        let shape = image.shape();
        let data = Array3::from_shape_vec((shape[0], shape[1], shape[2]), voxels).map_err(|_| {
            Error::ShapeMismatch {
                expected: shape.to_vec(),
                actual: vec![image.num_voxels()],
            }
        })?;
        Ok(Self { data })
    }

    /// Wrap an existing boolean array laid out `[Z, Y, X]`.
    pub fn from_array(data: Array3<bool>) -> Self {
        Self { data }
    }

    /// Shape in tensor order `[Z, Y, X]`, equal to the source image shape.
    pub fn shape(&self) -> [usize; 3] {
        let (d, h, w) = self.data.dim();
        [d, h, w]
    }

    /// Number of voxels in the mask.
    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }

    /// Whether the voxel at `index` (`[x, y, z]`) is set; false outside the grid.
    pub fn is_set(&self, index: VoxelIndex) -> bool {
        let [x, y, z] = index;
        self.data.get((z, y, x)).copied().unwrap_or(false)
    }

    /// Indices of all set voxels. The order is unspecified.
    pub fn coordinates(&self) -> Vec<VoxelIndex> {
        self.data
            .indexed_iter()
            .filter(|(_, v)| **v)
            .map(|((z, y, x), _)| [x, y, z])
            .collect()
    }

    pub fn as_array(&self) -> &Array3<bool> {
        &self.data
    }
}

/// Shuffle `coords` with `rng` and keep at most `cap` of them.
///
/// Fewer than `cap` inputs are returned (shuffled) without padding.
pub fn sample_coordinates<R: Rng + ?Sized>(
    mut coords: Vec<VoxelIndex>,
    cap: usize,
    rng: &mut R,
) -> Vec<VoxelIndex> {
    coords.shuffle(rng);
    coords.truncate(cap);
    coords
}
