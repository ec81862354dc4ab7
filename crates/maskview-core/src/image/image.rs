//! Image type with physical metadata and coordinate transformations.
//!
//! An [`Image`] pairs a burn tensor of voxel values with the origin, spacing and
//! direction that place each voxel in physical space.

use burn::tensor::backend::Backend;
use burn::tensor::{ElementConversion, Shape, Tensor, TensorData};

use super::metadata::ImageMetadata;
use crate::error::{Error, Result};
use crate::spatial::{Direction, Point, Spacing, Vector};

/// Medical image with physical metadata.
///
/// # Coordinate Systems
/// * **Index Space**: voxel indices `(x, y, z)`; `spacing[i]` and direction column `i`
///   belong to index component `i`.
/// * **Physical Space**: continuous world coordinates (RAS+ for NIfTI input).
///
/// The tensor itself is stored `[Z, Y, X]` so that `x` is the fastest varying axis.
///
/// # Examples
/// ```rust
/// use maskview_core::Image;
/// use maskview_core::spatial::{Point3, Spacing3, Direction3};
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let data = Tensor::<Backend, 3>::zeros([20, 64, 64], &device);
/// let image = Image::new(data, Point3::origin(), Spacing3::uniform(1.0), Direction3::identity());
/// assert_eq!(image.size(), [64, 64, 20]);
/// ```
#[derive(Debug, Clone)]
pub struct Image<B: Backend, const D: usize> {
    data: Tensor<B, D>,
    /// Physical coordinate of the first voxel (index 0, 0, 0).
    origin: Point<D>,
    /// Physical distance between voxels along each index axis.
    spacing: Spacing<D>,
    /// Orientation of the index axes.
    direction: Direction<D>,
}

impl<B: Backend, const D: usize> Image<B, D> {
    /// Create a new image with the given data and metadata.
    pub fn new(
        data: Tensor<B, D>,
        origin: Point<D>,
        spacing: Spacing<D>,
        direction: Direction<D>,
    ) -> Self {
        Self {
            data,
            origin,
            spacing,
            direction,
        }
    }

    /// Create an image from a tensor and a metadata bundle.
    pub fn from_metadata(data: Tensor<B, D>, metadata: &ImageMetadata<D>) -> Self {
        Self::new(
            data,
            *metadata.origin(),
            *metadata.spacing(),
            *metadata.direction(),
        )
    }

    /// Get the image data tensor.
    pub fn data(&self) -> &Tensor<B, D> {
        &self.data
    }

    /// Get the origin (physical coordinate of first voxel).
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction matrix.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Copy of the spatial metadata.
    pub fn metadata(&self) -> ImageMetadata<D> {
        ImageMetadata::new(self.origin, self.spacing, self.direction)
    }

    /// Tensor shape (`[Z, Y, X]` for volumes).
    pub fn shape(&self) -> [usize; D] {
        self.data
            .shape()
            .dims
            .try_into()
            .expect("Tensor rank mismatch")
    }

    /// Voxel count along each index axis, in index order (`[X, Y, Z]` for volumes).
    pub fn size(&self) -> [usize; D] {
        let mut size = self.shape();
        size.reverse();
        size
    }

    /// Total number of voxels.
    pub fn num_voxels(&self) -> usize {
        self.shape().iter().product()
    }

    /// Map a continuous index to its physical point.
    ///
    /// `point = origin + Direction * (index * spacing)`
    pub fn index_to_physical(&self, index: &Point<D>) -> Point<D> {
        let mut scaled = Vector::<D>::zeros();
        for i in 0..D {
            scaled[i] = index[i] * self.spacing[i];
        }
        self.origin + self.direction * scaled
    }

    /// Map a physical point to its continuous index.
    ///
    /// `index = (Direction^-1 * (point - origin)) / spacing`
    pub fn physical_to_index(&self, point: &Point<D>) -> Result<Point<D>> {
        let inv_dir = self.inverse_direction()?;
        let rotated = inv_dir * (*point - self.origin);
        let mut index = Point::<D>::origin();
        for i in 0..D {
            index[i] = rotated[i] / self.spacing[i];
        }
        Ok(index)
    }

    /// Batch map physical points `[N, D]` to continuous indices `[N, D]`.
    pub fn world_to_index_tensor(&self, points: Tensor<B, 2>) -> Result<Tensor<B, 2>> {
        let device = points.device();
        let inv_dir = self.inverse_direction()?;

        let origin_vec: Vec<f32> = (0..D).map(|i| self.origin[i] as f32).collect();
        let origin_tensor =
            Tensor::<B, 1>::from_data(TensorData::new(origin_vec, Shape::new([D])), &device)
                .reshape([1, D]);

        // I = (P - O) @ T with T[r, c] = inv_dir[c, r] / spacing[c]
        let mut t_data = Vec::with_capacity(D * D);
        for r in 0..D {
            for c in 0..D {
                t_data.push((inv_dir[(c, r)] / self.spacing[c]) as f32);
            }
        }
        let t_tensor =
            Tensor::<B, 2>::from_data(TensorData::new(t_data, Shape::new([D, D])), &device);

        Ok((points - origin_tensor).matmul(t_tensor))
    }

    /// Smallest voxel value.
    pub fn min_value(&self) -> f32 {
        self.data.clone().min().into_scalar().elem::<f32>()
    }

    /// Copy voxel values to the host in tensor (row-major) order.
    pub fn to_voxels(&self) -> Result<Vec<f32>> {
        self.data
            .to_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| Error::transform(format!("Failed to read tensor data: {:?}", e)))
    }

    /// Build an image from host voxels laid out in tensor order.
    pub fn from_voxels(
        voxels: Vec<f32>,
        shape: [usize; D],
        metadata: &ImageMetadata<D>,
        device: &B::Device,
    ) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if voxels.len() != expected {
            return Err(Error::ShapeMismatch {
                expected: shape.to_vec(),
                actual: vec![voxels.len()],
            });
        }
        let data = Tensor::<B, D>::from_data(TensorData::new(voxels, Shape::new(shape)), device);
        Ok(Self::from_metadata(data, metadata))
    }

    fn inverse_direction(&self) -> Result<Direction<D>> {
        self.direction
            .try_inverse()
            .ok_or_else(|| Error::transform("Direction matrix is not invertible"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type Backend = NdArray<f32>;
    type Point3 = Point<3>;
    type Spacing3 = Spacing<3>;
    type Direction3 = Direction<3>;

    fn blank(shape: [usize; 3], origin: Point3, spacing: Spacing3) -> Image<Backend, 3> {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::zeros(shape, &device);
        Image::new(data, origin, spacing, Direction3::identity())
    }

    #[test]
    fn test_image_creation() {
        let image = blank([4, 5, 6], Point3::origin(), Spacing3::uniform(1.0));
        assert_eq!(image.shape(), [4, 5, 6]);
        assert_eq!(image.size(), [6, 5, 4]);
        assert_eq!(image.num_voxels(), 120);
        assert_eq!(image.metadata().spacing(), &Spacing3::uniform(1.0));
    }

    #[test]
    fn test_index_physical_roundtrip() {
        let image = blank(
            [10, 10, 10],
            Point3::new([10.0, 20.0, 30.0]),
            Spacing3::new([2.0, 1.0, 0.5]),
        );
        let index = Point3::new([1.0, 2.0, 4.0]);
        let point = image.index_to_physical(&index);
        assert_eq!(point, Point3::new([12.0, 22.0, 32.0]));

        let back = image.physical_to_index(&point).unwrap();
        for i in 0..3 {
            assert!((back[i] - index[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_world_to_index_tensor() {
        let device = Default::default();
        let image = blank([10, 10, 10], Point3::new([1.0, 1.0, 1.0]), Spacing3::uniform(2.0));
        let points = Tensor::<Backend, 2>::from_floats([[5.0, 3.0, 1.0]], &device);
        let indices = image.world_to_index_tensor(points).unwrap().into_data();
        let indices = indices.as_slice::<f32>().unwrap();
        assert!((indices[0] - 2.0).abs() < 1e-5);
        assert!((indices[1] - 1.0).abs() < 1e-5);
        assert!(indices[2].abs() < 1e-5);
    }

    #[test]
    fn test_singular_direction_is_rejected() {
        let device = Default::default();
        let data = Tensor::<Backend, 3>::zeros([2, 2, 2], &device);
        let mut direction = Direction3::identity();
        direction[(2, 2)] = 0.0;
        let image = Image::new(data, Point3::origin(), Spacing3::uniform(1.0), direction);
        assert!(matches!(
            image.physical_to_index(&Point3::origin()),
            Err(Error::Transform(_))
        ));
    }

    #[test]
    fn test_voxel_roundtrip_and_min() {
        let device = Default::default();
        let voxels: Vec<f32> = (0..24).map(|v| v as f32 - 3.0).collect();
        let image = Image::<Backend, 3>::from_voxels(
            voxels.clone(),
            [2, 3, 4],
            &ImageMetadata::default(),
            &device,
        )
        .unwrap();
        assert_eq!(image.to_voxels().unwrap(), voxels);
        assert_eq!(image.min_value(), -3.0);

        let err = Image::<Backend, 3>::from_voxels(vec![0.0; 5], [2, 3, 4], &ImageMetadata::default(), &device);
        assert!(matches!(err, Err(Error::ShapeMismatch { .. })));
    }
}
