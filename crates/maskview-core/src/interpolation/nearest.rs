//! Nearest neighbour interpolation.
//!
//! Label volumes are categorical, so resampling must pick an existing value
//! rather than blend neighbours.

use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use super::trait_::Interpolator;

/// Nearest Neighbor Interpolator.
///
/// Rounds every continuous index to the closest voxel and clamps it to the
/// tensor bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighborInterpolator;

impl NearestNeighborInterpolator {
    /// Create a new nearest neighbor interpolator.
    pub fn new() -> Self {
        Self
    }
}

impl<B: Backend> Interpolator<B> for NearestNeighborInterpolator {
    fn interpolate<const D: usize>(&self, data: &Tensor<B, D>, indices: Tensor<B, 2>) -> Tensor<B, 1> {
        let dims = data.dims();
        let n = indices.dims()[0];
        let device = indices.device();
        if dims.contains(&0) {
            return Tensor::zeros([n], &device);
        }

        // Index column k addresses tensor axis D - 1 - k (x is the last tensor axis).
        let mut flat = Tensor::<B, 1, Int>::zeros([n], &device);
        let mut stride = 1usize;
        for k in 0..D {
            let extent = dims[D - 1 - k];
            let coord = indices.clone().slice([0..n, k..k + 1]).squeeze::<1>(1);
            let idx = coord.round().clamp(0.0, (extent - 1) as f64).int();
            flat = flat + idx * (stride as i32);
            stride *= extent;
        }

        data.clone().reshape([stride]).gather(0, flat)
    }
}
