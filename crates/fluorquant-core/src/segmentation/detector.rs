use tracing::debug;

use crate::region::Region;

use super::components::{circularity, connected_components};
use super::config::DetectionConfig;
use super::mask::Mask;

/// Extract candidate regions from a (separated) mask.
///
/// Pipeline: 8-connected labeling -> border exclusion -> area filter ->
/// circularity filter. Survivors get ids 1..=n in raster order of their first
/// pixel. An empty result is valid.
pub fn detect_regions(mask: &Mask, config: &DetectionConfig) -> Vec<Region> {
    let (h, w) = mask.dim();
    let components = connected_components(mask);
    let total = components.len();

    let mut regions = Vec::new();
    for component in components {
        if config.exclude_edges && component.touches_border(h, w) {
            continue;
        }
        let area = component.area() as f64;
        // Cheap area check first; perimeter needs a pass over the component.
        if area < config.min_area || area > config.max_area {
            continue;
        }
        let perimeter = component.perimeter();
        let circularity = circularity(area, perimeter);
        if !config.accepts(area, circularity) {
            continue;
        }
        let id = regions.len() as u32 + 1;
        regions.push(Region::from_component(id, component, perimeter, circularity));
    }

    debug!(
        components = total,
        kept = regions.len(),
        "Region detection complete"
    );
    regions
}
