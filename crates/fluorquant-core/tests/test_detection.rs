mod common;

use ndarray::Array2;

use fluorquant_core::segmentation::components::{circularity, connected_components};
use fluorquant_core::segmentation::{detect_regions, DetectionConfig, Mask};

use common::disk_mask;

/// Disks with areas of roughly 5000 and 6000 px.
fn two_blobs() -> Mask {
    let r1 = (5000.0 / std::f64::consts::PI).sqrt();
    let r2 = (6000.0 / std::f64::consts::PI).sqrt();
    disk_mask(200, 320, &[(100.0, 80.0, r1), (100.0, 220.0, r2)])
}

#[test]
fn test_two_blobs_default_ranges() {
    let regions = detect_regions(&two_blobs(), &DetectionConfig::default());
    assert_eq!(regions.len(), 2);
    for r in &regions {
        assert!(r.circularity > 0.85, "circularity {}", r.circularity);
        assert!(r.circularity <= 1.0);
    }
    // The larger disk reaches higher, so the raster scan meets it first.
    let areas: Vec<usize> = regions.iter().map(|r| r.area()).collect();
    assert!((5900..6100).contains(&areas[0]), "areas {areas:?}");
    assert!((4900..5100).contains(&areas[1]), "areas {areas:?}");
}

#[test]
fn test_two_blobs_narrow_area_range() {
    let config = DetectionConfig {
        min_area: 5500.0,
        max_area: 7000.0,
        ..Default::default()
    };
    let regions = detect_regions(&two_blobs(), &config);
    assert_eq!(regions.len(), 1);
    assert!(regions[0].area() > 5500);
    assert_eq!(regions[0].id, 1);
}

#[test]
fn test_ids_follow_raster_order() {
    // Lower disk is left of the upper one; the upper one is met first.
    let mask = disk_mask(
        300,
        300,
        &[(200.0, 70.0, 45.0), (80.0, 220.0, 45.0), (200.0, 220.0, 45.0)],
    );
    let regions = detect_regions(&mask, &DetectionConfig::default());
    let ids: Vec<u32> = regions.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(regions[0].centroid.0 < 100.0);
    assert!(regions[1].centroid.1 < regions[2].centroid.1);
}

#[test]
fn test_border_touching_regions_excluded() {
    // Second disk is cut off by the right edge.
    let mask = disk_mask(200, 300, &[(100.0, 80.0, 45.0), (100.0, 280.0, 45.0)]);
    let excluded = detect_regions(&mask, &DetectionConfig::default());
    assert_eq!(excluded.len(), 1);
    assert!(excluded[0].centroid.1 < 150.0);

    let config = DetectionConfig {
        exclude_edges: false,
        ..Default::default()
    };
    let included = detect_regions(&mask, &config);
    assert_eq!(included.len(), 2);
}

#[test]
fn test_elongated_component_fails_circularity() {
    // 10 x 500 bar: area 5000, circularity about 0.06.
    let mut data = Array2::from_elem((40, 540), false);
    for r in 15..25 {
        for c in 20..520 {
            data[[r, c]] = true;
        }
    }
    let mask = Mask::new(data);
    assert!(detect_regions(&mask, &DetectionConfig::default()).is_empty());

    let loose = DetectionConfig {
        min_circularity: 0.0,
        ..Default::default()
    };
    assert_eq!(detect_regions(&mask, &loose).len(), 1);
}

#[test]
fn test_detected_regions_respect_bounds() {
    let mask = disk_mask(
        400,
        400,
        &[
            (60.0, 60.0, 20.0),
            (60.0, 200.0, 38.0),
            (60.0, 330.0, 50.0),
            (220.0, 80.0, 60.0),
            (230.0, 250.0, 33.0),
            (340.0, 330.0, 40.0),
        ],
    );
    let configs = [
        DetectionConfig::default(),
        DetectionConfig {
            min_area: 4500.0,
            max_area: 9000.0,
            ..Default::default()
        },
        DetectionConfig {
            min_area: 0.0,
            max_area: f64::MAX,
            min_circularity: 0.9,
            max_circularity: 1.0,
            exclude_edges: true,
        },
    ];
    for config in &configs {
        for r in detect_regions(&mask, config) {
            let area = r.area() as f64;
            assert!(area >= config.min_area && area <= config.max_area);
            assert!(r.circularity >= config.min_circularity);
            assert!(r.circularity <= config.max_circularity);
            assert!((0.0..=1.0).contains(&r.circularity));
        }
    }
}

#[test]
fn test_region_shape_matches_its_component() {
    let mask = two_blobs();
    let components = connected_components(&mask);
    let regions = detect_regions(&mask, &DetectionConfig::default());
    assert_eq!(components.len(), regions.len());

    for (component, region) in components.iter().zip(&regions) {
        let perimeter = component.perimeter();
        assert_eq!(region.pixels(), &component.pixels[..]);
        assert_eq!(region.perimeter, perimeter);
        assert_eq!(
            region.circularity,
            circularity(component.area() as f64, perimeter)
        );
    }
}

#[test]
fn test_empty_mask_gives_no_regions() {
    let mask = Mask::new(Array2::from_elem((50, 50), false));
    assert!(detect_regions(&mask, &DetectionConfig::default()).is_empty());
}

#[test]
fn test_connected_components_uses_8_connectivity() {
    // Two pixels touching only at a corner form one component.
    let mut data = Array2::from_elem((4, 4), false);
    data[[1, 1]] = true;
    data[[2, 2]] = true;
    data[[0, 3]] = true;
    let comps = connected_components(&Mask::new(data));
    assert_eq!(comps.len(), 2);
    // First pixel (0, 3) comes first in raster order.
    assert_eq!(comps[0].pixels, vec![(0, 3)]);
    assert_eq!(comps[1].pixels, vec![(1, 1), (2, 2)]);
}

#[test]
fn test_connected_components_u_shape_merges() {
    // Arms of a U get different provisional labels and must be merged.
    let mut data = Array2::from_elem((5, 5), false);
    for r in 0..4 {
        data[[r, 0]] = true;
        data[[r, 4]] = true;
    }
    for c in 0..5 {
        data[[4, c]] = true;
    }
    let comps = connected_components(&Mask::new(data));
    assert_eq!(comps.len(), 1);
    assert_eq!(comps[0].area(), 13);
    assert_eq!(comps[0].bbox, (0, 4, 0, 4));
}

#[test]
fn test_circularity_formula() {
    let r = 10.0;
    let c = circularity(std::f64::consts::PI * r * r, 2.0 * std::f64::consts::PI * r);
    assert!((c - 1.0).abs() < 1e-12);
    assert_eq!(circularity(100.0, 0.0), 0.0);
    // Clamped above at 1.
    assert_eq!(circularity(100.0, 1.0), 1.0);
}

#[test]
fn test_detection_config_validation() {
    assert!(DetectionConfig::default().validate().is_ok());
    let bad_area = DetectionConfig {
        min_area: 10.0,
        max_area: 5.0,
        ..Default::default()
    };
    assert!(bad_area.validate().is_err());
    let bad_circ = DetectionConfig {
        max_circularity: 1.5,
        ..Default::default()
    };
    assert!(bad_circ.validate().is_err());
}
