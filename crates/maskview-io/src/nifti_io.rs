//! NIfTI-1 reading and writing.
//!
//! Volumes are loaded as `f32` labels into an [`Image<B, 3>`] whose physical
//! space is the NIfTI RAS+ world.

use std::path::Path;

use burn::tensor::backend::Backend;
use maskview_core::error::{Error, Result};
use maskview_core::image::{Image, ImageMetadata};
use maskview_core::spatial::{Direction, Point, Spacing, Vector};
use ndarray::{Array3, ArrayD, Axis, Ix3};
use nifti::writer::WriterOptions;
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};
use tracing::debug;

/// Read a single-channel NIfTI volume (`.nii` or `.nii.gz`).
///
/// Dimensions after the third must be singleton and are dropped.
pub fn read_nifti<B: Backend, P: AsRef<Path>>(path: P, device: &B::Device) -> Result<Image<B, 3>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::load(format!("{}: no such file", path.display())));
    }

    let obj = ReaderOptions::new()
        .read_file(path)
        .map_err(|e| Error::load(format!("{}: not a readable NIfTI file: {}", path.display(), e)))?;
    let metadata = metadata_from_header(obj.header());

    let volume = obj
        .into_volume()
        .into_ndarray::<f32>()
        .map_err(|e| Error::load(format!("{}: failed to decode voxels: {}", path.display(), e)))?;
    let volume = squeeze_channels(volume)
        .map_err(|msg| Error::load(format!("{}: {}", path.display(), msg)))?;

    let (nx, ny, nz) = volume.dim();
    // Tensor layout is [Z, Y, X]: walk the reversed view so x varies fastest.
    let voxels: Vec<f32> = volume.permuted_axes([2, 1, 0]).iter().copied().collect();

    debug!(
        path = %path.display(),
        size = ?[nx, ny, nz],
        spacing = ?metadata.spacing().to_array(),
        "loaded NIfTI volume"
    );
    Image::from_voxels(voxels, [nz, ny, nx], &metadata, device)
}

/// Write an image as float32 NIfTI with an sform affine.
///
/// The file is gzip-compressed when the path ends in `.gz`.
pub fn write_nifti<B: Backend, P: AsRef<Path>>(path: P, image: &Image<B, 3>) -> Result<()> {
    let path = path.as_ref();
    let [nx, ny, nz] = image.size();
    let voxels = image.to_voxels()?;
    let array = Array3::from_shape_fn((nx, ny, nz), |(x, y, z)| voxels[(z * ny + y) * nx + x]);

    let header = header_from_metadata(&image.metadata());
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(&array)
        .map_err(|e| Error::write(format!("{}: {}", path.display(), e)))?;

    debug!(path = %path.display(), size = ?[nx, ny, nz], "wrote NIfTI volume");
    Ok(())
}

/// Drop trailing singleton dimensions until the volume is 3D.
fn squeeze_channels(mut volume: ArrayD<f32>) -> std::result::Result<Array3<f32>, String> {
    if volume.ndim() < 3 {
        return Err(format!(
            "expected a 3D volume, found {} dimensions",
            volume.ndim()
        ));
    }
    while volume.ndim() > 3 {
        let last = volume.ndim() - 1;
        if volume.shape()[last] != 1 {
            return Err(format!(
                "expected a single-channel volume, dimension {} has extent {}",
                last + 1,
                volume.shape()[last]
            ));
        }
        volume = volume.index_axis_move(Axis(last), 0);
    }
    volume
        .into_dimensionality::<Ix3>()
        .map_err(|e| format!("unexpected volume layout: {}", e))
}

/// Voxel-to-world affine: sform, then qform, then pixdim scaling.
fn header_affine(header: &NiftiHeader) -> [[f64; 4]; 4] {
    let rows: [[f32; 4]; 3] = if header.sform_code > 0 {
        [header.srow_x, header.srow_y, header.srow_z]
    } else if header.qform_code > 0 {
        let (b, c, d) = (header.quatern_b, header.quatern_c, header.quatern_d);
        let a = (1.0 - (b * b + c * c + d * d).min(1.0)).sqrt();
        let qfac = if header.pixdim[0] < 0.0 { -1.0 } else { 1.0 };
        let (dx, dy, dz) = (header.pixdim[1], header.pixdim[2], header.pixdim[3] * qfac);
        [
            [
                (a * a + b * b - c * c - d * d) * dx,
                (2.0 * b * c - 2.0 * a * d) * dy,
                (2.0 * b * d + 2.0 * a * c) * dz,
                header.quatern_x,
            ],
            [
                (2.0 * b * c + 2.0 * a * d) * dx,
                (a * a + c * c - b * b - d * d) * dy,
                (2.0 * c * d - 2.0 * a * b) * dz,
                header.quatern_y,
            ],
            [
                (2.0 * b * d - 2.0 * a * c) * dx,
                (2.0 * c * d + 2.0 * a * b) * dy,
                (a * a + d * d - c * c - b * b) * dz,
                header.quatern_z,
            ],
        ]
    } else {
        let p = header.pixdim;
        [
            [p[1], 0.0, 0.0, 0.0],
            [0.0, p[2], 0.0, 0.0],
            [0.0, 0.0, p[3], 0.0],
        ]
    };

    let mut affine = [[0.0; 4]; 4];
    for (r, row) in rows.iter().enumerate() {
        for c in 0..4 {
            affine[r][c] = row[c] as f64;
        }
    }
    affine[3][3] = 1.0;
    affine
}

fn metadata_from_header(header: &NiftiHeader) -> ImageMetadata<3> {
    let affine = header_affine(header);
    let origin = Point::new([affine[0][3], affine[1][3], affine[2][3]]);

    let mut spacing = Spacing::<3>::zeros();
    let mut columns = [Vector::<3>::zeros(); 3];
    for c in 0..3 {
        let column = Vector::new([affine[0][c], affine[1][c], affine[2][c]]);
        let norm = column.norm();
        if norm > 1e-9 {
            spacing[c] = norm;
            columns[c] = column * (1.0 / norm);
        } else {
            // Missing scale: unit spacing along the matching world axis.
            spacing[c] = 1.0;
            columns[c][c] = 1.0;
        }
    }

    ImageMetadata::new(origin, spacing, Direction::from_columns(columns))
}

fn header_from_metadata(metadata: &ImageMetadata<3>) -> NiftiHeader {
    let affine = metadata.affine();
    let row = |r: usize| -> [f32; 4] {
        [
            affine[r][0] as f32,
            affine[r][1] as f32,
            affine[r][2] as f32,
            affine[r][3] as f32,
        ]
    };

    let mut header = NiftiHeader::default();
    header.sform_code = 2;
    header.qform_code = 0;
    header.srow_x = row(0);
    header.srow_y = row(1);
    header.srow_z = row(2);
    header.pixdim[0] = 1.0;
    for a in 0..3 {
        header.pixdim[a + 1] = metadata.spacing()[a] as f32;
    }
    header
}
