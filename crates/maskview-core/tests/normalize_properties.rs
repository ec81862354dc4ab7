use burn_ndarray::NdArray;
use maskview_core::config::GeometryConfig;
use maskview_core::filter::normalize;
use maskview_core::spatial::{Direction, Point, Spacing};
use maskview_core::{sample_coordinates, Image, ImageMetadata, LabelMask};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

type Backend = NdArray<f32>;

const TARGET: usize = 16;

fn geometry() -> GeometryConfig {
    GeometryConfig {
        target_shape: [TARGET; 3],
        spacing: [1.5; 3],
        ..GeometryConfig::default()
    }
}

fn labelled_volume(
    size: [usize; 3],
    spacing: [f64; 3],
    labels: &[(usize, u8)],
) -> Image<Backend, 3> {
    let count = size.iter().product::<usize>();
    let mut voxels = vec![0.0f32; count];
    for &(flat, label) in labels {
        voxels[flat % count] = label as f32;
    }
    let metadata = ImageMetadata::new(Point::origin(), Spacing::new(spacing), Direction::identity());
    Image::from_voxels(voxels, [size[2], size[1], size[0]], &metadata, &Default::default())
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_normalized_shape_is_target(
        nx in 1usize..24, ny in 1usize..24, nz in 1usize..12,
        sx in 0.5f64..3.0, sy in 0.5f64..3.0, sz in 0.5f64..3.0,
        labels in prop::collection::vec((0usize..10_000, 0u8..6), 0..20),
    ) {
        let image = labelled_volume([nx, ny, nz], [sx, sy, sz], &labels);
        let normalized = normalize("prop", &image, &geometry()).unwrap();
        prop_assert_eq!(normalized.size(), [TARGET; 3]);
        prop_assert_eq!(normalized.spacing(), &Spacing::uniform(1.5));
    }

    #[test]
    fn test_mask_is_subset_and_sample_is_bounded(
        nx in 1usize..24, ny in 1usize..24, nz in 1usize..12,
        labels in prop::collection::vec((0usize..10_000, 0u8..6), 0..40),
        cap in 1usize..30,
        seed in any::<u64>(),
    ) {
        let image = labelled_volume([nx, ny, nz], [1.5; 3], &labels);
        let normalized = normalize("prop", &image, &geometry()).unwrap();
        let mask = LabelMask::from_image(&normalized, &[2, 4]).unwrap();
        prop_assert_eq!(mask.shape(), normalized.shape());

        let voxels = normalized.to_voxels().unwrap();
        let coords = mask.coordinates();
        prop_assert_eq!(coords.len(), mask.count());
        for &[x, y, z] in &coords {
            let value = voxels[(z * TARGET + y) * TARGET + x];
            prop_assert!(value == 2.0 || value == 4.0);
        }

        let count = coords.len();
        let sample = sample_coordinates(coords, cap, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(sample.len(), count.min(cap));
        prop_assert!(sample.iter().all(|&p| mask.is_set(p)));
    }

    #[test]
    fn test_normalization_is_deterministic(
        nx in 1usize..16, ny in 1usize..16, nz in 1usize..8,
        labels in prop::collection::vec((0usize..5_000, 0u8..6), 1..20),
    ) {
        let image = labelled_volume([nx, ny, nz], [2.0, 1.0, 1.5], &labels);
        let first = normalize("a", &image, &geometry()).unwrap();
        let second = normalize("a", &image, &geometry()).unwrap();
        prop_assert_eq!(first.to_voxels().unwrap(), second.to_voxels().unwrap());
        prop_assert_eq!(first.metadata(), second.metadata());
    }
}
