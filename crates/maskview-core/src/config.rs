//! Pipeline configuration.
//!
//! Defaults reproduce the fixed parameters of the mask viewer: RAS orientation,
//! 2.0 isotropic spacing, a 128³ cube, labels {2, 4}, at most 5000 points per mask,
//! red/blue markers of size 2 at 0.8 opacity on an 800×800 figure.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::PadFill;
use crate::orientation::Orientation;
use crate::spatial::Spacing;

/// Default output document name.
pub const DEFAULT_OUTPUT: &str = "binary_masks_3d.html";

/// Geometry normalization parameters, shared by both volumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Target axis codes.
    pub orientation: Orientation,
    /// Target voxel spacing, index order `[x, y, z]`.
    pub spacing: [f64; 3],
    /// Final volume size, index order `[x, y, z]`.
    pub target_shape: [usize; 3],
    /// Extra voxels kept around the foreground bounding box.
    pub crop_margin: usize,
    pub pad_fill: PadFill,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::RAS,
            spacing: [2.0; 3],
            target_shape: [128; 3],
            crop_margin: 0,
            pad_fill: PadFill::Minimum,
        }
    }
}

impl GeometryConfig {
    pub fn target_spacing(&self) -> Spacing<3> {
        Spacing::new(self.spacing)
    }
}

/// Mask extraction and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskConfig {
    /// Label values that count as mask voxels.
    pub labels: Vec<i32>,
    /// Maximum number of sampled voxels per mask.
    pub sample_cap: usize,
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            labels: vec![2, 4],
            sample_cap: 5000,
        }
    }
}

/// Scene appearance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    /// Trace names of the first and second volume.
    pub names: [String; 2],
    /// Marker colours of the first and second volume.
    pub colors: [String; 2],
    /// Display axis titles (x, y, z).
    pub axis_titles: [String; 3],
    pub marker_size: usize,
    pub opacity: f64,
    pub width: usize,
    pub height: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "3D Binary Masks".to_string(),
            names: ["A".to_string(), "B".to_string()],
            colors: ["red".to_string(), "blue".to_string()],
            axis_titles: ["X".to_string(), "Y".to_string(), "Z".to_string()],
            marker_size: 2,
            opacity: 0.8,
            width: 800,
            height: 800,
        }
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub geometry: GeometryConfig,
    pub mask: MaskConfig,
    pub render: RenderConfig,
    /// Where the HTML document is written.
    pub output: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            geometry: GeometryConfig::default(),
            mask: MaskConfig::default(),
            render: RenderConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target orientation.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.geometry.orientation = orientation;
        self
    }

    /// Set an isotropic target spacing.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.geometry.spacing = [spacing; 3];
        self
    }

    /// Set a cubic target shape.
    pub fn with_target_shape(mut self, extent: usize) -> Self {
        self.geometry.target_shape = [extent; 3];
        self
    }

    pub fn with_crop_margin(mut self, margin: usize) -> Self {
        self.geometry.crop_margin = margin;
        self
    }

    pub fn with_labels(mut self, labels: Vec<i32>) -> Self {
        self.mask.labels = labels;
        self
    }

    pub fn with_sample_cap(mut self, cap: usize) -> Self {
        self.mask.sample_cap = cap;
        self
    }

    pub fn with_names(mut self, first: impl Into<String>, second: impl Into<String>) -> Self {
        self.render.names = [first.into(), second.into()];
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Reject parameters the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.geometry.target_spacing().is_valid() {
            return Err(Error::invalid_configuration(format!(
                "spacing {:?} must be positive and finite",
                self.geometry.spacing
            )));
        }
        if self.geometry.target_shape.iter().any(|&t| t == 0) {
            return Err(Error::invalid_configuration(format!(
                "target shape {:?} has an empty axis",
                self.geometry.target_shape
            )));
        }
        if self.mask.labels.is_empty() {
            return Err(Error::invalid_configuration("label set is empty"));
        }
        if self.mask.sample_cap == 0 {
            return Err(Error::invalid_configuration("sample cap must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.render.opacity) {
            return Err(Error::invalid_configuration(format!(
                "opacity {} outside [0, 1]",
                self.render.opacity
            )));
        }
        if self.render.width == 0 || self.render.height == 0 {
            return Err(Error::invalid_configuration("figure size must be non-zero"));
        }
        if self.render.names[0] == self.render.names[1] {
            return Err(Error::invalid_configuration(format!(
                "volume names must differ, both are '{}'",
                self.render.names[0]
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.geometry.orientation, Orientation::RAS);
        assert_eq!(config.geometry.spacing, [2.0, 2.0, 2.0]);
        assert_eq!(config.geometry.target_shape, [128, 128, 128]);
        assert_eq!(config.geometry.pad_fill, PadFill::Minimum);
        assert_eq!(config.mask.labels, vec![2, 4]);
        assert_eq!(config.mask.sample_cap, 5000);
        assert_eq!(config.render.colors, ["red".to_string(), "blue".to_string()]);
        assert_eq!(config.render.marker_size, 2);
        assert_eq!(config.render.opacity, 0.8);
        assert_eq!((config.render.width, config.render.height), (800, 800));
        assert_eq!(config.output, PathBuf::from("binary_masks_3d.html"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{ "geometry": { "orientation": "LPS", "crop_margin": 1 }, "mask": { "labels": [1] } }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.geometry.orientation, Orientation::LPS);
        assert_eq!(config.geometry.crop_margin, 1);
        assert_eq!(config.geometry.target_shape, [128, 128, 128]);
        assert_eq!(config.mask.labels, vec![1]);
        assert_eq!(config.mask.sample_cap, 5000);
        assert_eq!(config.render, RenderConfig::default());
    }

    #[test]
    fn test_validation_failures() {
        let bad = [
            PipelineConfig::new().with_spacing(0.0),
            PipelineConfig::new().with_target_shape(0),
            PipelineConfig::new().with_labels(vec![]),
            PipelineConfig::new().with_sample_cap(0),
            PipelineConfig::new().with_names("A", "A"),
        ];
        for config in bad {
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidConfiguration(_))
            ));
        }

        let mut config = PipelineConfig::new();
        config.render.opacity = 1.5;
        assert!(config.validate().is_err());
    }
}
