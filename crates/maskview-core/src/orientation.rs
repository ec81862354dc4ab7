//! Anatomical axis codes and reorientation of volumes.
//!
//! Axis codes follow the NIfTI world convention: a voxel axis labelled `R` runs
//! towards the subject's right, `A` towards anterior and `S` towards superior.

use std::fmt;
use std::str::FromStr;

use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::image::{Image, ImageMetadata};
use crate::spatial::{Direction, Point, Spacing};

/// Anatomical direction a voxel axis points towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisCode {
    R,
    L,
    A,
    P,
    S,
    I,
}

impl AxisCode {
    /// Build the code for a world axis (0 = x, 1 = y, 2 = z) and sign.
    pub fn from_world(axis: usize, positive: bool) -> Self {
        match (axis, positive) {
            (0, true) => Self::R,
            (0, false) => Self::L,
            (1, true) => Self::A,
            (1, false) => Self::P,
            (2, true) => Self::S,
            _ => Self::I,
        }
    }

    /// World axis this code lies on.
    pub fn world_axis(self) -> usize {
        match self {
            Self::R | Self::L => 0,
            Self::A | Self::P => 1,
            Self::S | Self::I => 2,
        }
    }

    /// True for the codes pointing along the positive world axis.
    pub fn is_positive(self) -> bool {
        matches!(self, Self::R | Self::A | Self::S)
    }

    pub fn as_char(self) -> char {
        match self {
            Self::R => 'R',
            Self::L => 'L',
            Self::A => 'A',
            Self::P => 'P',
            Self::S => 'S',
            Self::I => 'I',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'R' => Some(Self::R),
            'L' => Some(Self::L),
            'A' => Some(Self::A),
            'P' => Some(Self::P),
            'S' => Some(Self::S),
            'I' => Some(Self::I),
            _ => None,
        }
    }
}

/// Axis codes for the three voxel axes of a volume, e.g. `RAS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Orientation([AxisCode; 3]);

impl Orientation {
    /// Right, anterior, superior.
    pub const RAS: Self = Self([AxisCode::R, AxisCode::A, AxisCode::S]);

    /// Left, posterior, superior (DICOM/ITK convention).
    pub const LPS: Self = Self([AxisCode::L, AxisCode::P, AxisCode::S]);

    /// Build an orientation; every world axis must appear exactly once.
    pub fn new(codes: [AxisCode; 3]) -> Result<Self> {
        let mut seen = [false; 3];
        for code in codes {
            let axis = code.world_axis();
            if seen[axis] {
                return Err(Error::transform(format!(
                    "Axis codes {} reuse world axis {}",
                    Self(codes),
                    axis
                )));
            }
            seen[axis] = true;
        }
        Ok(Self(codes))
    }

    pub fn codes(&self) -> [AxisCode; 3] {
        self.0
    }

    /// Axis codes of a direction matrix.
    ///
    /// Each voxel axis takes the world axis with the largest absolute component of
    /// its direction column.
    pub fn from_direction(direction: &Direction<3>) -> Result<Self> {
        let mut codes = [AxisCode::R; 3];
        for (c, code) in codes.iter_mut().enumerate() {
            let column = direction.column(c);
            let (axis, value) = (0..3)
                .map(|r| (r, column[r]))
                .fold((0, 0.0_f64), |best, cur| {
                    if cur.1.abs() > best.1.abs() {
                        cur
                    } else {
                        best
                    }
                });
            if value == 0.0 || !value.is_finite() {
                return Err(Error::transform(format!(
                    "Direction column {} has no dominant world axis",
                    c
                )));
            }
            *code = AxisCode::from_world(axis, value > 0.0);
        }
        Self::new(codes)
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for code in self.0 {
            write!(f, "{}", code.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Orientation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != 3 {
            return Err(Error::invalid_configuration(format!(
                "Orientation '{}' must have exactly three axis codes",
                s
            )));
        }
        let mut codes = [AxisCode::R; 3];
        for (code, c) in codes.iter_mut().zip(chars) {
            *code = AxisCode::from_char(c).ok_or_else(|| {
                Error::invalid_configuration(format!("Unknown axis code '{}' in '{}'", c, s))
            })?;
        }
        Self::new(codes)
    }
}

impl TryFrom<String> for Orientation {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Orientation> for String {
    fn from(value: Orientation) -> Self {
        value.to_string()
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::RAS
    }
}

/// Permute and flip voxel axes so the image axis codes equal `target`.
///
/// Voxel values keep their physical position; only the index layout and the
/// metadata change.
pub fn reorient<B: Backend>(image: &Image<B, 3>, target: Orientation) -> Result<Image<B, 3>> {
    let current = Orientation::from_direction(image.direction())?;
    if current == target {
        debug!(orientation = %current, "image already in target orientation");
        return Ok(image.clone());
    }

    let size_in = image.size();
    if size_in.contains(&0) {
        return Err(Error::transform(format!(
            "Cannot reorient an image with an empty axis, size {:?}",
            size_in
        )));
    }
    let mut src_axis = [0usize; 3];
    let mut flip = [false; 3];
    for (t, code) in target.codes().iter().enumerate() {
        // Orientation::new guarantees exactly one match.
        let c = current
            .codes()
            .iter()
            .position(|cur| cur.world_axis() == code.world_axis())
            .ok_or_else(|| Error::transform(format!("No axis of {} matches {}", current, target)))?;
        src_axis[t] = c;
        flip[t] = current.codes()[c].is_positive() != code.is_positive();
    }

    // Tensor axis p holds index axis 2 - p.
    let size_out = [size_in[src_axis[0]], size_in[src_axis[1]], size_in[src_axis[2]]];
    let permutation = [2 - src_axis[2], 2 - src_axis[1], 2 - src_axis[0]];
    let mut data = image.data().clone().permute(permutation.map(|a| a as isize));
    for (t, &flipped) in flip.iter().enumerate() {
        if flipped {
            data = data.flip([(2 - t) as isize]);
        }
    }

    let direction = image.direction();
    let mut first = Point::<3>::origin();
    let mut spacing = Spacing::<3>::zeros();
    let mut columns = [direction.column(0); 3];
    for t in 0..3 {
        let c = src_axis[t];
        spacing[t] = image.spacing()[c];
        columns[t] = if flip[t] {
            first[c] = (size_in[c] - 1) as f64;
            -direction.column(c)
        } else {
            direction.column(c)
        };
    }
    let metadata = ImageMetadata::new(
        image.index_to_physical(&first),
        spacing,
        Direction::from_columns(columns),
    );

    debug!(from = %current, to = %target, ?size_in, ?size_out, "reoriented image");
    Ok(Image::from_metadata(data, &metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Vector;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn lps_direction() -> Direction<3> {
        Direction::from_columns([
            Vector::new([-1.0, 0.0, 0.0]),
            Vector::new([0.0, -1.0, 0.0]),
            Vector::new([0.0, 0.0, 1.0]),
        ])
    }

    #[test]
    fn test_parse_and_display() {
        let o: Orientation = "ras".parse().unwrap();
        assert_eq!(o, Orientation::RAS);
        assert_eq!(Orientation::LPS.to_string(), "LPS");
        assert!("RAX".parse::<Orientation>().is_err());
        assert!("RRS".parse::<Orientation>().is_err());
        assert!("RA".parse::<Orientation>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Orientation::RAS).unwrap();
        assert_eq!(json, "\"RAS\"");
        let back: Orientation = serde_json::from_str("\"LPI\"").unwrap();
        assert_eq!(back.to_string(), "LPI");
        assert!(serde_json::from_str::<Orientation>("\"SSS\"").is_err());
    }

    #[test]
    fn test_from_direction() {
        assert_eq!(
            Orientation::from_direction(&Direction::identity()).unwrap(),
            Orientation::RAS
        );
        assert_eq!(
            Orientation::from_direction(&lps_direction()).unwrap(),
            Orientation::LPS
        );

        // Axes swapped: voxel x runs superior, voxel z runs right.
        let swapped = Direction::from_columns([
            Vector::new([0.0, 0.0, 1.0]),
            Vector::new([0.0, 1.0, 0.0]),
            Vector::new([1.0, 0.0, 0.0]),
        ]);
        assert_eq!(Orientation::from_direction(&swapped).unwrap().to_string(), "SAR");
    }

    #[test]
    fn test_degenerate_direction_is_rejected() {
        let degenerate = Direction::from_columns([
            Vector::new([1.0, 0.0, 0.0]),
            Vector::new([0.9, 0.1, 0.0]),
            Vector::new([0.0, 0.0, 1.0]),
        ]);
        assert!(matches!(
            Orientation::from_direction(&degenerate),
            Err(Error::Transform(_))
        ));
    }

    #[test]
    fn test_reorient_lps_to_ras_preserves_physical_positions() {
        let device = Default::default();
        // size (x, y, z) = (3, 2, 2); tensor [z, y, x]
        let voxels: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let metadata = ImageMetadata::new(
            Point::new([10.0, 20.0, 30.0]),
            Spacing::new([1.0, 2.0, 3.0]),
            lps_direction(),
        );
        let image =
            Image::<TestBackend, 3>::from_voxels(voxels.clone(), [2, 2, 3], &metadata, &device)
                .unwrap();

        let ras = reorient(&image, Orientation::RAS).unwrap();
        assert_eq!(ras.size(), [3, 2, 2]);
        assert_eq!(
            Orientation::from_direction(ras.direction()).unwrap(),
            Orientation::RAS
        );
        assert_eq!(ras.spacing(), &Spacing::new([1.0, 2.0, 3.0]));

        let out = ras.to_voxels().unwrap();
        // Every voxel must sit at the same world position before and after.
        for z in 0..2 {
            for y in 0..2 {
                for x in 0..3 {
                    let src = Point::new([x as f64, y as f64, z as f64]);
                    let world = image.index_to_physical(&src);
                    let dst = ras.physical_to_index(&world).unwrap();
                    let (dx, dy, dz) = (
                        dst[0].round() as usize,
                        dst[1].round() as usize,
                        dst[2].round() as usize,
                    );
                    assert_eq!(
                        out[(dz * 2 + dy) * 3 + dx],
                        voxels[(z * 2 + y) * 3 + x]
                    );
                }
            }
        }
    }

    #[test]
    fn test_reorient_permutes_axes() {
        let device = Default::default();
        // voxel x runs superior, voxel z runs right: size (x, y, z) = (4, 3, 2)
        let metadata = ImageMetadata::new(
            Point::origin(),
            Spacing::new([1.0, 1.0, 5.0]),
            Direction::from_columns([
                Vector::new([0.0, 0.0, 1.0]),
                Vector::new([0.0, 1.0, 0.0]),
                Vector::new([1.0, 0.0, 0.0]),
            ]),
        );
        let voxels: Vec<f32> = (0..24).map(|v| v as f32).collect();
        let image =
            Image::<TestBackend, 3>::from_voxels(voxels, [2, 3, 4], &metadata, &device).unwrap();

        let ras = reorient(&image, Orientation::RAS).unwrap();
        assert_eq!(ras.size(), [2, 3, 4]);
        assert_eq!(ras.spacing(), &Spacing::new([5.0, 1.0, 1.0]));
        assert_eq!(ras.direction(), &Direction::identity());

        // Output index (z, y, x) holds input voxel (x, y, z).
        let out = ras.to_voxels().unwrap();
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    assert_eq!(out[(x * 3 + y) * 2 + z], ((z * 3 + y) * 4 + x) as f32);
                }
            }
        }
    }

    #[test]
    fn test_reorient_empty_axis_is_transform_error() {
        let device = Default::default();
        let metadata = ImageMetadata::new(Point::origin(), Spacing::uniform(1.0), lps_direction());
        let image =
            Image::<TestBackend, 3>::from_voxels(Vec::new(), [0, 4, 4], &metadata, &device).unwrap();
        assert!(matches!(
            reorient(&image, Orientation::RAS),
            Err(Error::Transform(_))
        ));
    }

    #[test]
    fn test_reorient_identity_is_noop() {
        let device = Default::default();
        let image = Image::<TestBackend, 3>::from_voxels(
            vec![1.0; 8],
            [2, 2, 2],
            &ImageMetadata::default(),
            &device,
        )
        .unwrap();
        let same = reorient(&image, Orientation::RAS).unwrap();
        assert_eq!(same.metadata(), image.metadata());
    }
}
