//! Image types and operations.
//!
//! This module provides the Image type and its spatial metadata.

pub mod image;
pub mod metadata;

pub use image::Image;
pub use metadata::ImageMetadata;
