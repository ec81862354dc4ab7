//! Core types for loading-independent label volume processing.
//!
//! Images live on burn tensors; geometry normalization, mask extraction and
//! sampling all operate on [`Image<B, 3>`].

pub mod config;
pub mod error;
pub mod filter;
pub mod image;
pub mod interpolation;
pub mod mask;
pub mod orientation;
pub mod spatial;
pub mod transform;

pub use config::{GeometryConfig, MaskConfig, PipelineConfig, RenderConfig};
pub use error::{Error, Result};
pub use image::{Image, ImageMetadata};
pub use mask::{sample_coordinates, LabelMask, VoxelIndex};
pub use orientation::{AxisCode, Orientation};
pub use spatial::{Direction, Point, Spacing, Vector};
