//! Scene model and interactive HTML export for voxel point clouds.

pub mod scene;

pub use scene::{PointCloud, Scene};
