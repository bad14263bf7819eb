use std::collections::BTreeSet;

use crate::error::{QuantError, Result};
use crate::segmentation::components::{circularity, Component};

/// One region of interest.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Ordinal id, unique within an image's region set.
    pub id: u32,
    /// Pixels as (row, col), row-major.
    pixels: Vec<(usize, usize)>,
    pub perimeter: f64,
    /// 4π·area / perimeter², in [0, 1].
    pub circularity: f64,
    /// (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
    /// (row, col) centre of mass.
    pub centroid: (f64, f64),
}

impl Region {
    /// Wrap a component whose perimeter and circularity were already measured.
    pub(crate) fn from_component(
        id: u32,
        component: Component,
        perimeter: f64,
        circularity: f64,
    ) -> Self {
        let centroid = centroid(&component.pixels);
        Self {
            id,
            pixels: component.pixels,
            perimeter,
            circularity,
            bbox: component.bbox,
            centroid,
        }
    }

    /// Build a region from an arbitrary pixel set (manual ROI). Duplicates are
    /// removed; returns `None` for an empty set.
    pub fn from_pixels(id: u32, pixels: impl IntoIterator<Item = (usize, usize)>) -> Option<Self> {
        let unique: BTreeSet<(usize, usize)> = pixels.into_iter().collect();
        let pixels: Vec<(usize, usize)> = unique.into_iter().collect();
        let first = *pixels.first()?;
        let bbox = pixels.iter().fold(
            (first.0, first.0, first.1, first.1),
            |(r0, r1, c0, c1), &(r, c)| (r0.min(r), r1.max(r), c0.min(c), c1.max(c)),
        );
        let component = Component { pixels, bbox };
        let perimeter = component.perimeter();
        let circularity = circularity(component.area() as f64, perimeter);
        Some(Self::from_component(id, component, perimeter, circularity))
    }

    /// Pixel count.
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[(usize, usize)] {
        &self.pixels
    }
}

fn centroid(pixels: &[(usize, usize)]) -> (f64, f64) {
    let n = pixels.len().max(1) as f64;
    let (sr, sc) = pixels
        .iter()
        .fold((0.0, 0.0), |(sr, sc), &(r, c)| (sr + r as f64, sc + c as f64));
    (sr / n, sc / n)
}

/// Region set still open to revision.
#[derive(Clone, Debug)]
pub struct CandidateRegions {
    regions: Vec<Region>,
    /// (height, width) of the source image.
    dim: (usize, usize),
}

impl CandidateRegions {
    pub fn new(dim: (usize, usize), regions: Vec<Region>) -> Self {
        Self { regions, dim }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    /// Replace the whole set with a fresh detection pass.
    pub fn replace(&mut self, regions: Vec<Region>) {
        self.regions = regions;
    }

    /// Remove a region. Remaining ids are left unchanged.
    pub fn remove(&mut self, id: u32) -> Option<Region> {
        let pos = self.regions.iter().position(|r| r.id == id)?;
        Some(self.regions.remove(pos))
    }

    /// Add a manually drawn region; it gets the next free id.
    pub fn insert_pixels(&mut self, pixels: Vec<(usize, usize)>) -> Result<u32> {
        let (h, w) = self.dim;
        if let Some(&(r, c)) = pixels.iter().find(|&&(r, c)| r >= h || c >= w) {
            return Err(QuantError::InvalidConfig(format!(
                "manual region pixel ({r}, {c}) lies outside the {w}x{h} image"
            )));
        }
        let id = self.regions.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let region = Region::from_pixels(id, pixels).ok_or_else(|| {
            QuantError::InvalidConfig("manual region has no pixels".to_string())
        })?;
        self.regions.push(region);
        Ok(id)
    }

    /// Close the set to further edits.
    pub fn freeze(mut self) -> FrozenRegions {
        self.regions.sort_by_key(|r| r.id);
        FrozenRegions {
            regions: self.regions,
            dim: self.dim,
        }
    }
}

/// Region set accepted by the operator. Immutable; shared by every channel
/// during measurement.
#[derive(Clone, Debug, PartialEq)]
pub struct FrozenRegions {
    regions: Vec<Region>,
    dim: (usize, usize),
}

impl FrozenRegions {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Regions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn get(&self, id: u32) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }
}
