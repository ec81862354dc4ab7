use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_ndarray::NdArray;
use clap::Parser;
use maskview::run_pipeline;
use maskview_core::{Orientation, PipelineConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Backend = NdArray<f32>;

#[derive(Parser)]
#[command(name = "maskview")]
#[command(about = "Normalize two label volumes and plot their label masks as a 3D scatter")]
struct Cli {
    /// First label volume (.nii or .nii.gz)
    first: PathBuf,

    /// Second label volume (.nii or .nii.gz)
    second: PathBuf,

    /// Output HTML file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON pipeline configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for point sampling (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Label values that form the mask
    #[arg(long, value_delimiter = ',')]
    labels: Option<Vec<i32>>,

    /// Maximum number of plotted points per volume
    #[arg(long)]
    sample_cap: Option<usize>,

    /// Isotropic target spacing
    #[arg(long)]
    spacing: Option<f64>,

    /// Cubic target shape
    #[arg(long)]
    shape: Option<usize>,

    /// Target orientation code, e.g. RAS
    #[arg(long)]
    orientation: Option<Orientation>,

    /// Voxels kept around the foreground when cropping
    #[arg(long)]
    crop_margin: Option<usize>,

    /// Names of the two point clouds
    #[arg(long, value_delimiter = ',')]
    names: Option<Vec<String>>,

    /// Also write the normalized volumes into this directory
    #[arg(long)]
    save_normalized: Option<PathBuf>,
}

impl Cli {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str::<PipelineConfig>(&text)
                    .with_context(|| format!("Failed to parse config {}", path.display()))?
            }
            None => PipelineConfig::new(),
        };

        if let Some(orientation) = self.orientation {
            config = config.with_orientation(orientation);
        }
        if let Some(spacing) = self.spacing {
            config = config.with_spacing(spacing);
        }
        if let Some(shape) = self.shape {
            config = config.with_target_shape(shape);
        }
        if let Some(margin) = self.crop_margin {
            config = config.with_crop_margin(margin);
        }
        if let Some(labels) = &self.labels {
            config = config.with_labels(labels.clone());
        }
        if let Some(cap) = self.sample_cap {
            config = config.with_sample_cap(cap);
        }
        if let Some(names) = &self.names {
            match names.as_slice() {
                [first, second] => config = config.with_names(first, second),
                _ => anyhow::bail!("--names takes exactly two names, got {}", names.len()),
            }
        }
        if let Some(output) = &self.output {
            config = config.with_output(output);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config()?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let device = Default::default();

    let summary = run_pipeline::<Backend, _>(
        [cli.first.as_path(), cli.second.as_path()],
        &config,
        cli.save_normalized.as_deref(),
        &mut rng,
        &device,
    )
    .with_context(|| {
        format!(
            "Failed to plot masks of {} and {}",
            cli.first.display(),
            cli.second.display()
        )
    })?;

    for volume in &summary.volumes {
        info!(
            "{}: {} mask voxels, {} plotted",
            volume.name, volume.mask_voxels, volume.sampled
        );
    }
    info!("Wrote {}", summary.output.display());
    Ok(())
}
