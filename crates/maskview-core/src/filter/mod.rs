//! Image filters used by geometry normalization.

pub mod resample;
pub mod crop;
pub mod pad;
pub mod normalize;

pub use crop::{crop_foreground, foreground_bounds};
pub use normalize::normalize;
pub use pad::{resize_with_pad_or_crop, symmetric_offsets, PadFill};
pub use resample::{resample_to_spacing, ResampleImageFilter};
