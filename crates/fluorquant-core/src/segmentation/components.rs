use std::f64::consts::{PI, SQRT_2};

use ndarray::Array2;

use super::mask::Mask;

/// A connected component of a mask.
#[derive(Clone, Debug)]
pub struct Component {
    /// Pixels as (row, col), in row-major order.
    pub pixels: Vec<(usize, usize)>,
    /// Bounding box: (min_row, max_row, min_col, max_col).
    pub bbox: (usize, usize, usize, usize),
}

impl Component {
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    /// Boundary length estimate; see [`perimeter`].
    pub fn perimeter(&self) -> f64 {
        perimeter(&self.pixels, self.bbox)
    }

    pub fn touches_border(&self, height: usize, width: usize) -> bool {
        touches_border(self.bbox, height, width)
    }
}

/// Label the 8-connected components of a mask using two-pass union-find.
///
/// Components are returned in row-major order of their first pixel, the same
/// order a raster scan meets them.
pub fn connected_components(mask: &Mask) -> Vec<Component> {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return Vec::new();
    }

    let mut labels = Array2::<u32>::zeros((h, w));
    let mut next_label: u32 = 1;
    // Union-find parent array. Index 0 unused; labels start at 1.
    let mut parent: Vec<u32> = vec![0];

    // Pass 1: assign provisional labels from the already-visited neighbours
    // (up-left, up, up-right, left).
    for row in 0..h {
        for col in 0..w {
            if !mask.data[[row, col]] {
                continue;
            }

            let mut assigned = 0u32;
            for (dr, dc) in [(-1isize, -1isize), (-1, 0), (-1, 1), (0, -1)] {
                let r = row as isize + dr;
                let c = col as isize + dc;
                if r < 0 || c < 0 || c >= w as isize {
                    continue;
                }
                let lbl = labels[[r as usize, c as usize]];
                if lbl == 0 {
                    continue;
                }
                if assigned == 0 {
                    assigned = lbl;
                } else if assigned != lbl {
                    union(&mut parent, assigned, lbl);
                    assigned = assigned.min(lbl);
                }
            }

            if assigned == 0 {
                parent.push(next_label);
                assigned = next_label;
                next_label += 1;
            }
            labels[[row, col]] = assigned;
        }
    }

    // Flatten parent references. Roots are the smallest label in their set,
    // which is the label created at the component's first pixel.
    for i in 1..next_label as usize {
        parent[i] = find(&parent, i as u32);
    }

    // Pass 2: resolve labels and collect pixels.
    let mut slot_of_root = vec![usize::MAX; next_label as usize];
    let mut components: Vec<Component> = Vec::new();

    for row in 0..h {
        for col in 0..w {
            let lbl = labels[[row, col]];
            if lbl == 0 {
                continue;
            }
            let root = parent[lbl as usize] as usize;
            if slot_of_root[root] == usize::MAX {
                slot_of_root[root] = components.len();
                components.push(Component {
                    pixels: Vec::new(),
                    bbox: (row, row, col, col),
                });
            }
            let entry = &mut components[slot_of_root[root]];
            entry.pixels.push((row, col));
            entry.bbox.0 = entry.bbox.0.min(row);
            entry.bbox.1 = entry.bbox.1.max(row);
            entry.bbox.2 = entry.bbox.2.min(col);
            entry.bbox.3 = entry.bbox.3.max(col);
        }
    }

    components
}

/// Returns true if the bounding box touches any edge of the image.
pub fn touches_border(bbox: (usize, usize, usize, usize), height: usize, width: usize) -> bool {
    let (min_row, max_row, min_col, max_col) = bbox;
    min_row == 0 || max_row + 1 >= height || min_col == 0 || max_col + 1 >= width
}

/// 4π·area / perimeter², clamped to [0, 1]. Zero perimeter gives 0.
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    (4.0 * PI * area / (perimeter * perimeter)).clamp(0.0, 1.0)
}

/// Estimate the boundary length of a pixel set.
///
/// Boundary pixels are those with at least one 4-neighbour outside the set.
/// Each boundary pixel contributes a length chosen from the configuration of
/// boundary pixels around it: 1 along straight runs, √2 along diagonal runs,
/// (1+√2)/2 where a straight run turns into a diagonal one.
pub fn perimeter(pixels: &[(usize, usize)], bbox: (usize, usize, usize, usize)) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let (min_row, max_row, min_col, max_col) = bbox;
    // One pixel of padding on every side so neighbours never leave the array.
    let h = max_row - min_row + 3;
    let w = max_col - min_col + 3;
    let mut inside = Array2::from_elem((h, w), false);
    for &(r, c) in pixels {
        inside[[r - min_row + 1, c - min_col + 1]] = true;
    }

    let mut border = Array2::from_elem((h, w), false);
    for r in 1..h - 1 {
        for c in 1..w - 1 {
            if inside[[r, c]]
                && !(inside[[r - 1, c]]
                    && inside[[r + 1, c]]
                    && inside[[r, c - 1]]
                    && inside[[r, c + 1]])
            {
                border[[r, c]] = true;
            }
        }
    }

    let mut total = 0.0;
    for r in 1..h - 1 {
        for c in 1..w - 1 {
            if !border[[r, c]] {
                continue;
            }
            let straight = [
                border[[r - 1, c]],
                border[[r + 1, c]],
                border[[r, c - 1]],
                border[[r, c + 1]],
            ]
            .iter()
            .filter(|&&b| b)
            .count();
            let diagonal = [
                border[[r - 1, c - 1]],
                border[[r - 1, c + 1]],
                border[[r + 1, c - 1]],
                border[[r + 1, c + 1]],
            ]
            .iter()
            .filter(|&&b| b)
            .count();
            total += boundary_weight(straight, diagonal);
        }
    }
    total
}

fn boundary_weight(straight: usize, diagonal: usize) -> f64 {
    match (straight, diagonal) {
        (2, 0) | (3, 0) | (2, 1) | (3, 1) | (2, 2) | (3, 2) => 1.0,
        (0, 2) | (1, 3) => SQRT_2,
        (1, 1) | (1, 2) => (1.0 + SQRT_2) / 2.0,
        _ => 0.0,
    }
}

fn find(parent: &[u32], mut x: u32) -> u32 {
    while parent[x as usize] != x {
        x = parent[x as usize];
    }
    x
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        // Merge larger root into smaller root so the root stays the first label.
        let (small, big) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[big as usize] = small;
    }
}
