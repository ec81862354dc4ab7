//! 3D scatter scenes built with plotly.
//!
//! Voxel indices are displayed with index axis 0 on the display Y axis,
//! index axis 1 on display X and index axis 2 on display Z.

use std::path::Path;

use maskview_core::config::RenderConfig;
use maskview_core::error::{Error, Result};
use maskview_core::VoxelIndex;
use plotly::common::{Marker, Mode, Title};
use plotly::layout::{AspectMode, Axis, LayoutScene};
use plotly::{Layout, Plot, Scatter3D};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A named, coloured set of voxels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloud {
    pub name: String,
    pub color: String,
    pub points: Vec<VoxelIndex>,
}

impl PointCloud {
    pub fn new(name: impl Into<String>, color: impl Into<String>, points: Vec<VoxelIndex>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Display coordinates `(x, y, z)` of every point.
    pub fn display_coordinates(&self) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        let x = self.points.iter().map(|p| p[1]).collect();
        let y = self.points.iter().map(|p| p[0]).collect();
        let z = self.points.iter().map(|p| p[2]).collect();
        (x, y, z)
    }
}

/// One figure holding any number of point clouds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub title: String,
    pub clouds: Vec<PointCloud>,
    /// Display axis titles (x, y, z).
    pub axis_titles: [String; 3],
    pub width: usize,
    pub height: usize,
    pub marker_size: usize,
    pub opacity: f64,
}

impl Scene {
    /// Scene with the appearance taken from `config`.
    pub fn from_config(config: &RenderConfig, clouds: Vec<PointCloud>) -> Self {
        Self {
            title: config.title.clone(),
            clouds,
            axis_titles: config.axis_titles.clone(),
            width: config.width,
            height: config.height,
            marker_size: config.marker_size,
            opacity: config.opacity,
        }
    }

    /// Total number of points over all clouds.
    pub fn num_points(&self) -> usize {
        self.clouds.iter().map(PointCloud::len).sum()
    }

    /// Build the plotly figure.
    pub fn to_plot(&self) -> Plot {
        let mut plot = Plot::new();
        for cloud in &self.clouds {
            let (x, y, z) = cloud.display_coordinates();
            let trace = Scatter3D::new(x, y, z)
                .name(cloud.name.as_str())
                .mode(Mode::Markers)
                .marker(
                    Marker::new()
                        .size(self.marker_size)
                        .color(cloud.color.clone())
                        .opacity(self.opacity),
                );
            plot.add_trace(trace);
        }

        let scene = LayoutScene::new()
            .aspect_mode(AspectMode::Data)
            .x_axis(Axis::new().title(Title::with_text(self.axis_titles[0].as_str())))
            .y_axis(Axis::new().title(Title::with_text(self.axis_titles[1].as_str())))
            .z_axis(Axis::new().title(Title::with_text(self.axis_titles[2].as_str())));
        let layout = Layout::new()
            .title(Title::with_text(self.title.as_str()))
            .width(self.width)
            .height(self.height)
            .scene(scene);
        plot.set_layout(layout);
        plot
    }

    /// Self-contained HTML document with plotly.js embedded.
    pub fn to_html(&self) -> String {
        self.to_plot().to_html()
    }

    /// Write the HTML document to `path`, replacing any existing file.
    pub fn write_html<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let html = self.to_html();
        debug!(bytes = html.len(), "rendered scene");

        std::fs::write(path, html)
            .map_err(|e| Error::render(format!("{}: {}", path.display(), e)))?;
        info!(
            path = %path.display(),
            clouds = self.clouds.len(),
            points = self.num_points(),
            "wrote scene"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_axis_mapping() {
        let cloud = PointCloud::new("A", "red", vec![[1, 2, 3], [4, 5, 6]]);
        let (x, y, z) = cloud.display_coordinates();
        assert_eq!(x, vec![2, 5]);
        assert_eq!(y, vec![1, 4]);
        assert_eq!(z, vec![3, 6]);
    }

    #[test]
    fn test_from_config_defaults() {
        let scene = Scene::from_config(&RenderConfig::default(), Vec::new());
        assert_eq!(scene.title, "3D Binary Masks");
        assert_eq!((scene.width, scene.height), (800, 800));
        assert_eq!(scene.marker_size, 2);
        assert_eq!(scene.opacity, 0.8);
        assert_eq!(scene.num_points(), 0);
    }
}
