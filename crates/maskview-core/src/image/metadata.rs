//! Spatial metadata bundle (origin, spacing, direction).

use crate::spatial::{Direction, Point, Spacing, Vector};

/// Physical placement of an image grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageMetadata<const D: usize> {
    origin: Point<D>,
    spacing: Spacing<D>,
    direction: Direction<D>,
}

impl<const D: usize> ImageMetadata<D> {
    /// Create new image metadata.
    pub fn new(origin: Point<D>, spacing: Spacing<D>, direction: Direction<D>) -> Self {
        Self {
            origin,
            spacing,
            direction,
        }
    }

    /// Get the origin.
    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    /// Get the spacing.
    pub fn spacing(&self) -> &Spacing<D> {
        &self.spacing
    }

    /// Get the direction.
    pub fn direction(&self) -> &Direction<D> {
        &self.direction
    }

    /// Same grid with the origin moved to the voxel at `offset` (may be negative).
    pub fn shifted(&self, offset: [f64; D]) -> Self {
        let mut scaled = Vector::<D>::zeros();
        for i in 0..D {
            scaled[i] = offset[i] * self.spacing[i];
        }
        Self {
            origin: self.origin + self.direction * scaled,
            ..*self
        }
    }

    /// Same origin and direction with new spacing.
    pub fn with_spacing(&self, spacing: Spacing<D>) -> Self {
        Self { spacing, ..*self }
    }
}

impl ImageMetadata<3> {
    /// 4×4 homogeneous voxel-to-world matrix, row-major.
    pub fn affine(&self) -> [[f64; 4]; 4] {
        let mut affine = [[0.0; 4]; 4];
        for r in 0..3 {
            for c in 0..3 {
                affine[r][c] = self.direction[(r, c)] * self.spacing[c];
            }
            affine[r][3] = self.origin[r];
        }
        affine[3][3] = 1.0;
        affine
    }
}

impl<const D: usize> Default for ImageMetadata<D> {
    fn default() -> Self {
        Self {
            origin: Point::origin(),
            spacing: Spacing::uniform(1.0),
            direction: Direction::identity(),
        }
    }
}
