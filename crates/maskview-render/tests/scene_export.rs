use maskview_core::config::RenderConfig;
use maskview_core::Error;
use maskview_render::{PointCloud, Scene};
use serde_json::Value;
use tempfile::tempdir;

fn two_cloud_scene() -> Scene {
    let first = PointCloud::new("A", "red", vec![[1, 2, 3], [1, 3, 3]]);
    let second = PointCloud::new("B", "blue", vec![[100, 110, 120]]);
    Scene::from_config(&RenderConfig::default(), vec![first, second])
}

fn figure(scene: &Scene) -> Value {
    serde_json::from_str(&scene.to_plot().to_json()).unwrap()
}

#[test]
fn test_traces_carry_style_and_axis_mapping() {
    let fig = figure(&two_cloud_scene());
    let traces = fig["data"].as_array().unwrap();
    assert_eq!(traces.len(), 2);

    let first = &traces[0];
    assert_eq!(first["type"], "scatter3d");
    assert_eq!(first["mode"], "markers");
    assert_eq!(first["name"], "A");
    assert_eq!(first["marker"]["color"], "red");
    assert_eq!(first["marker"]["size"], 2);
    assert_eq!(first["marker"]["opacity"], 0.8);
    assert_eq!(first["x"], serde_json::json!([2, 3]));
    assert_eq!(first["y"], serde_json::json!([1, 1]));
    assert_eq!(first["z"], serde_json::json!([3, 3]));

    assert_eq!(traces[1]["marker"]["color"], "blue");
    assert_eq!(traces[1]["x"], serde_json::json!([110]));
}

#[test]
fn test_layout_size_and_aspect() {
    let fig = figure(&two_cloud_scene());
    let layout = &fig["layout"];
    assert_eq!(layout["width"], 800);
    assert_eq!(layout["height"], 800);
    assert_eq!(layout["scene"]["aspectmode"], "data");
}

#[test]
fn test_disjoint_clouds_do_not_overlap() {
    let scene = two_cloud_scene();
    let a = &scene.clouds[0].points;
    let b = &scene.clouds[1].points;
    assert!(a.iter().all(|p| !b.contains(p)));
    assert_eq!(scene.num_points(), 3);
}

#[test]
fn test_empty_clouds_render() {
    let clouds = vec![
        PointCloud::new("A", "red", Vec::new()),
        PointCloud::new("B", "blue", Vec::new()),
    ];
    let scene = Scene::from_config(&RenderConfig::default(), clouds);
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.html");
    scene.write_html(&path).unwrap();

    let html = std::fs::read_to_string(&path).unwrap();
    assert!(html.contains("<html"));
    let fig = figure(&scene);
    assert_eq!(fig["data"].as_array().unwrap().len(), 2);
}

#[test]
fn test_write_html_overwrites() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("binary_masks_3d.html");
    std::fs::write(&path, "stale").unwrap();

    two_cloud_scene().write_html(&path).unwrap();
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(!html.starts_with("stale"));
    assert!(html.contains("3D Binary Masks"));
}

#[test]
fn test_unwritable_path_is_render_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.html");
    let result = two_cloud_scene().write_html(&path);
    assert!(matches!(result, Err(Error::Render(_))));
}
