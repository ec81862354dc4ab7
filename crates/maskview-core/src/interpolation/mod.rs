//! Interpolation used by the resampling filter.

pub mod trait_;
pub mod nearest;

pub use trait_::Interpolator;
pub use nearest::NearestNeighborInterpolator;
