use ndarray::Array2;

use super::config::SeparationConfig;
use super::distance::distance_transform;
use super::mask::{neighbours_8, Mask};

const UNVISITED: u32 = 0;
const RIDGE: u32 = u32::MAX;

/// Split touching objects along the ridges of the distance transform.
///
/// Returns the input mask with one-pixel-wide background cuts between basins.
/// Deterministic: pixels are flooded from the highest distance downwards and
/// pixels at equal distance in row-major order (top row first, then left to
/// right).
pub fn separate(mask: &Mask, config: &SeparationConfig) -> Mask {
    if !config.enabled || mask.is_empty() {
        return mask.clone();
    }
    let labels = watershed_labels(mask, config.tolerance);
    Mask::new(labels.mapv(|l| l != UNVISITED && l != RIDGE))
}

/// Label every foreground pixel with its basin; ridge pixels get `u32::MAX`,
/// background stays 0. Basin labels are union-find roots and are not
/// contiguous.
pub fn watershed_labels(mask: &Mask, tolerance: f32) -> Array2<u32> {
    let (h, w) = mask.dim();
    let dist = distance_transform(mask);

    let mut order: Vec<(usize, usize)> = mask
        .data
        .indexed_iter()
        .filter(|(_, &fg)| fg)
        .map(|(idx, _)| idx)
        .collect();
    order.sort_unstable_by(|&a, &b| {
        dist[[b.0, b.1]]
            .total_cmp(&dist[[a.0, a.1]])
            .then_with(|| a.cmp(&b))
    });

    let mut labels = Array2::<u32>::zeros((h, w));
    let mut basins = Basins::default();
    let mut roots: Vec<u32> = Vec::with_capacity(8);

    for (row, col) in order {
        let level = dist[[row, col]];

        roots.clear();
        for (nr, nc) in neighbours_8(row, col, h, w) {
            let l = labels[[nr, nc]];
            if l != UNVISITED && l != RIDGE {
                roots.push(basins.find(l));
            }
        }
        roots.sort_unstable();
        roots.dedup();

        labels[[row, col]] = match roots.len() {
            0 => basins.create(level),
            1 => roots[0],
            _ => basins.resolve(&roots, level, tolerance).unwrap_or(RIDGE),
        };
    }

    labels
}

/// Union-find over basins, each root carrying the height of its peak.
#[derive(Default)]
struct Basins {
    parent: Vec<u32>,
    peak: Vec<f32>,
}

impl Basins {
    fn create(&mut self, level: f32) -> u32 {
        if self.parent.is_empty() {
            // Index 0 is reserved for UNVISITED.
            self.parent.push(0);
            self.peak.push(0.0);
        }
        let id = self.parent.len() as u32;
        self.parent.push(id);
        self.peak.push(level);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Several basins meet at a pixel at `level`. Basins less than
    /// `tolerance` above the meeting level merge into the highest one.
    /// Returns the surviving basin, or `None` if two or more significant
    /// basins remain and the pixel is a ridge.
    fn resolve(&mut self, roots: &[u32], level: f32, tolerance: f32) -> Option<u32> {
        // Highest peak wins; equal peaks fall back to the older basin.
        let highest = roots.iter().copied().fold(roots[0], |best, r| {
            if self.peak[r as usize] > self.peak[best as usize] {
                r
            } else {
                best
            }
        });

        let mut significant = 1;
        for &r in roots {
            if r == highest {
                continue;
            }
            if self.peak[r as usize] - level < tolerance {
                self.parent[r as usize] = highest;
            } else {
                significant += 1;
            }
        }

        (significant == 1).then_some(highest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_square_is_one_basin() {
        let mut data = Array2::from_elem((12, 12), false);
        for r in 2..10 {
            for c in 2..10 {
                data[[r, c]] = true;
            }
        }
        let mask = Mask::new(data);
        let separated = separate(&mask, &SeparationConfig::default());
        assert_eq!(separated, mask);
    }
}
