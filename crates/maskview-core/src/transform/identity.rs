//! Identity transform.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use super::trait_::Transform;

/// Maps every point onto itself.
///
/// Used when resampling only changes the grid (spacing, size) and not the
/// physical placement of the content.
#[derive(Debug)]
pub struct IdentityTransform<B: Backend, const D: usize> {
    _phantom: PhantomData<B>,
}

impl<B: Backend, const D: usize> IdentityTransform<B, D> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<B: Backend, const D: usize> Transform<B, D> for IdentityTransform<B, D> {
    fn transform_points(&self, points: Tensor<B, 2>) -> Tensor<B, 2> {
        points
    }
}
