//! Two-volume mask viewer pipeline.
//!
//! `load -> normalize -> mask -> sample -> render`, run once for a pair of label
//! volumes with a shared [`PipelineConfig`].

use std::path::{Path, PathBuf};

use burn::tensor::backend::Backend;
use maskview_core::filter::normalize;
use maskview_core::{sample_coordinates, Image, LabelMask, PipelineConfig, Result, VoxelIndex};
use maskview_io::{read_nifti, write_nifti};
use maskview_render::{PointCloud, Scene};
use rand::Rng;
use tracing::{info, warn};

/// One volume after normalization, masking and sampling.
#[derive(Debug, Clone)]
pub struct PreparedVolume<B: Backend> {
    pub name: String,
    pub image: Image<B, 3>,
    pub mask: LabelMask,
    pub sample: Vec<VoxelIndex>,
}

/// Counts reported for one volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSummary {
    pub name: String,
    /// Normalized size, index order.
    pub size: [usize; 3],
    pub mask_voxels: usize,
    pub sampled: usize,
}

impl<B: Backend> PreparedVolume<B> {
    pub fn summary(&self) -> VolumeSummary {
        VolumeSummary {
            name: self.name.clone(),
            size: self.image.size(),
            mask_voxels: self.mask.count(),
            sampled: self.sample.len(),
        }
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub volumes: [VolumeSummary; 2],
    pub output: PathBuf,
    pub normalized: Vec<PathBuf>,
}

/// Normalize one loaded volume, extract its mask and sample it.
pub fn prepare_volume<B: Backend, R: Rng + ?Sized>(
    name: &str,
    image: &Image<B, 3>,
    config: &PipelineConfig,
    rng: &mut R,
) -> Result<PreparedVolume<B>> {
    let normalized = normalize(name, image, &config.geometry)?;
    let mask = LabelMask::from_image(&normalized, &config.mask.labels)?;
    let count = mask.count();
    if count == 0 {
        warn!(name, labels = ?config.mask.labels, "mask is empty");
    }

    let sample = sample_coordinates(mask.coordinates(), config.mask.sample_cap, rng);
    info!(
        name,
        size = ?normalized.size(),
        mask_voxels = count,
        sampled = sample.len(),
        "prepared volume"
    );

    Ok(PreparedVolume {
        name: name.to_string(),
        image: normalized,
        mask,
        sample,
    })
}

/// Scene with one cloud per prepared volume, coloured in order.
pub fn build_scene<B: Backend>(volumes: &[PreparedVolume<B>], config: &PipelineConfig) -> Scene {
    let clouds = volumes
        .iter()
        .zip(config.render.colors.iter())
        .map(|(volume, color)| PointCloud::new(&volume.name, color, volume.sample.clone()))
        .collect();
    Scene::from_config(&config.render, clouds)
}

/// Run the whole pipeline on two NIfTI files and write the HTML scene.
///
/// When `save_normalized` is set, each normalized volume is also written there as
/// `<name>_normalized.nii.gz`.
pub fn run_pipeline<B: Backend, R: Rng + ?Sized>(
    inputs: [&Path; 2],
    config: &PipelineConfig,
    save_normalized: Option<&Path>,
    rng: &mut R,
    device: &B::Device,
) -> Result<RunSummary> {
    config.validate()?;

    let mut images = Vec::with_capacity(2);
    for (path, name) in inputs.iter().zip(config.render.names.iter()) {
        let image = read_nifti::<B, _>(path, device)?;
        info!(name = name.as_str(), path = %path.display(), size = ?image.size(), "loaded");
        images.push(image);
    }

    let mut prepared = Vec::with_capacity(2);
    for (image, name) in images.iter().zip(config.render.names.iter()) {
        prepared.push(prepare_volume(name, image, config, rng)?);
    }

    let mut normalized = Vec::new();
    if let Some(dir) = save_normalized {
        std::fs::create_dir_all(dir)?;
        for volume in &prepared {
            let path = dir.join(format!("{}_normalized.nii.gz", volume.name));
            write_nifti(&path, &volume.image)?;
            info!(name = volume.name.as_str(), path = %path.display(), "saved normalized volume");
            normalized.push(path);
        }
    }

    build_scene(&prepared, config).write_html(&config.output)?;

    Ok(RunSummary {
        volumes: [prepared[0].summary(), prepared[1].summary()],
        output: config.output.clone(),
        normalized,
    })
}
