//! Resample image filter.
//!
//! Resamples an image onto a new grid through a transform and an interpolator.

use std::marker::PhantomData;

use burn::tensor::backend::Backend;
use burn::tensor::{Shape, Tensor, TensorData};
use tracing::debug;

use crate::error::{Error, Result};
use crate::image::Image;
use crate::interpolation::{Interpolator, NearestNeighborInterpolator};
use crate::spatial::{Direction, Point, Spacing};
use crate::transform::{IdentityTransform, Transform};

/// Resample image filter.
///
/// For each output voxel the filter computes its physical point, maps it through
/// the transform (output space -> input space), converts it to an input index and
/// interpolates. Points outside the input field of view get the default value.
///
/// # Type Parameters
/// * `B` - The Burn backend
/// * `T` - The transform type
/// * `I` - The interpolator type
/// * `D` - The dimensionality
pub struct ResampleImageFilter<B, T, I, const D: usize>
where
    B: Backend,
    T: Transform<B, D>,
    I: Interpolator<B>,
{
    size: [usize; D],
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
    transform: T,
    interpolator: I,
    default_pixel_value: f64,
    _phantom: PhantomData<B>,
}

impl<B, T, I, const D: usize> ResampleImageFilter<B, T, I, D>
where
    B: Backend,
    T: Transform<B, D>,
    I: Interpolator<B>,
{
    /// Create a new resample filter.
    ///
    /// # Arguments
    /// * `size` - Output tensor shape (`[Z, Y, X]` for volumes)
    /// * `origin` - Output image origin (physical)
    /// * `spacing` - Output image spacing (physical)
    /// * `direction` - Output image direction (matrix)
    /// * `transform` - Transform from output space to input space
    /// * `interpolator` - Interpolator for input image sampling
    pub fn new(
        size: [usize; D],
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
        transform: T,
        interpolator: I,
    ) -> Self {
        Self {
            size,
            origin,
            spacing,
            direction,
            transform,
            interpolator,
            default_pixel_value: 0.0,
            _phantom: PhantomData,
        }
    }

    /// Set default pixel value for outside the field of view.
    pub fn with_default_pixel_value(mut self, value: f64) -> Self {
        self.default_pixel_value = value;
        self
    }

    /// Apply filter to an input image.
    pub fn apply(&self, input: &Image<B, D>) -> Result<Image<B, D>> {
        if self.size.iter().any(|&s| s == 0) {
            return Err(Error::transform(format!(
                "Resample size {:?} has an empty axis",
                self.size
            )));
        }
        if !self.spacing.is_valid() {
            return Err(Error::transform(format!(
                "Resample spacing {:?} must be positive and finite",
                self.spacing.to_array()
            )));
        }

        let device = input.data().device();
        let output_indices = self.generate_grid_indices(&device);
        let output_points = self.indices_to_physical(output_indices);
        let input_points = self.transform.transform_points(output_points);
        let input_indices = input.world_to_index_tensor(input_points)?;

        let outside = outside_field_of_view(&input_indices, input.shape());
        let values = self
            .interpolator
            .interpolate(input.data(), input_indices)
            .mask_fill(outside, self.default_pixel_value);

        Ok(Image::new(
            values.reshape(Shape::new(self.size)),
            self.origin,
            self.spacing,
            self.direction,
        ))
    }

    /// Continuous indices `[N, D]` of every output voxel, `x` first.
    fn generate_grid_indices(&self, device: &B::Device) -> Tensor<B, 2> {
        let total: usize = self.size.iter().product();
        let mut grid = Vec::with_capacity(total * D);
        let mut index = [0usize; D];
        for flat in 0..total {
            let mut rem = flat;
            for axis in (0..D).rev() {
                index[axis] = rem % self.size[axis];
                rem /= self.size[axis];
            }
            grid.extend(index.iter().rev().map(|&i| i as f32));
        }
        Tensor::<B, 2>::from_data(TensorData::new(grid, Shape::new([total, D])), device)
    }

    /// `point = origin + (index * spacing) @ Direction^T`
    fn indices_to_physical(&self, indices: Tensor<B, 2>) -> Tensor<B, 2> {
        let device = indices.device();

        let origin_vec: Vec<f32> = (0..D).map(|i| self.origin[i] as f32).collect();
        let origin_tensor =
            Tensor::<B, 1>::from_data(TensorData::new(origin_vec, Shape::new([D])), &device)
                .reshape([1, D]);

        let spacing_vec: Vec<f32> = (0..D).map(|i| self.spacing[i] as f32).collect();
        let spacing_tensor =
            Tensor::<B, 1>::from_data(TensorData::new(spacing_vec, Shape::new([D])), &device)
                .reshape([1, D]);

        let mut dir_data = Vec::with_capacity(D * D);
        for c in 0..D {
            for r in 0..D {
                dir_data.push(self.direction[(r, c)] as f32);
            }
        }
        let dir_t_tensor =
            Tensor::<B, 2>::from_data(TensorData::new(dir_data, Shape::new([D, D])), &device);

        origin_tensor + (indices * spacing_tensor).matmul(dir_t_tensor)
    }
}

/// Rows of `indices` that round to no voxel of a tensor with `shape`.
fn outside_field_of_view<B: Backend, const D: usize>(
    indices: &Tensor<B, 2>,
    shape: [usize; D],
) -> Tensor<B, 1, burn::tensor::Bool> {
    let n = indices.dims()[0];
    let mut inside = Tensor::<B, 1>::ones([n], &indices.device());
    for k in 0..D {
        let extent = shape[D - 1 - k] as f64;
        let coord = indices.clone().slice([0..n, k..k + 1]).squeeze::<1>(1);
        let lower = coord.clone().greater_equal_elem(-0.5).float();
        let upper = coord.lower_elem(extent - 0.5).float();
        inside = inside * lower * upper;
    }
    inside.lower_elem(0.5)
}

/// Resample a volume onto `spacing` with nearest neighbour interpolation.
///
/// The output keeps the input origin and direction; each axis gets
/// `max(1, round(n * s / t))` voxels.
pub fn resample_to_spacing<B: Backend>(
    image: &Image<B, 3>,
    spacing: Spacing<3>,
) -> Result<Image<B, 3>> {
    if !spacing.is_valid() {
        return Err(Error::transform(format!(
            "Target spacing {:?} must be positive and finite",
            spacing.to_array()
        )));
    }

    let size_in = image.size();
    if size_in.contains(&0) {
        return Err(Error::transform(format!(
            "Cannot resample an image with an empty axis, size {:?}",
            size_in
        )));
    }
    let mut size_out = [0usize; 3];
    for a in 0..3 {
        let extent = size_in[a] as f64 * image.spacing()[a] / spacing[a];
        size_out[a] = (extent.round() as usize).max(1);
    }
    debug!(
        ?size_in,
        ?size_out,
        from = ?image.spacing().to_array(),
        to = ?spacing.to_array(),
        "resampling to spacing"
    );

    ResampleImageFilter::new(
        [size_out[2], size_out[1], size_out[0]],
        *image.origin(),
        spacing,
        *image.direction(),
        IdentityTransform::<B, 3>::new(),
        NearestNeighborInterpolator::new(),
    )
    .apply(image)
}
