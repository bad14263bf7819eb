use std::collections::VecDeque;

use ndarray::Array2;

/// Binary raster derived from the boundary channel. `true` is foreground.
#[derive(Clone, Debug, PartialEq)]
pub struct Mask {
    pub data: Array2<bool>,
}

impl Mask {
    pub fn new(data: Array2<bool>) -> Self {
        Self { data }
    }

    /// (height, width).
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn foreground_count(&self) -> usize {
        self.data.iter().filter(|&&v| v).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.data.iter().any(|&v| v)
    }
}

/// Threshold a raster. Pixels at or above `threshold` are foreground
/// (bright objects on a dark background).
pub fn build_mask(data: &Array2<f32>, threshold: f32) -> Mask {
    Mask::new(data.mapv(|v| v >= threshold))
}

/// Fill interior holes: background pixels that cannot reach the image border
/// through 4-connected background become foreground.
pub fn fill_holes(mask: &Mask) -> Mask {
    let (h, w) = mask.dim();
    if h == 0 || w == 0 {
        return mask.clone();
    }
    let mut outside = Array2::from_elem((h, w), false);
    let mut queue = VecDeque::new();

    let mut seed = |row: usize, col: usize, outside: &mut Array2<bool>| {
        if !mask.data[[row, col]] && !outside[[row, col]] {
            outside[[row, col]] = true;
            queue.push_back((row, col));
        }
    };
    for col in 0..w {
        seed(0, col, &mut outside);
        seed(h - 1, col, &mut outside);
    }
    for row in 0..h {
        seed(row, 0, &mut outside);
        seed(row, w - 1, &mut outside);
    }

    while let Some((row, col)) = queue.pop_front() {
        for (nr, nc) in neighbours_4(row, col, h, w) {
            if !mask.data[[nr, nc]] && !outside[[nr, nc]] {
                outside[[nr, nc]] = true;
                queue.push_back((nr, nc));
            }
        }
    }

    Mask::new(outside.mapv(|reached| !reached))
}

pub(crate) fn neighbours_4(
    row: usize,
    col: usize,
    h: usize,
    w: usize,
) -> impl Iterator<Item = (usize, usize)> {
    const OFFSETS: [(isize, isize); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];
    neighbours(row, col, h, w, &OFFSETS)
}

/// 8-connected neighbours in row-major order.
pub(crate) fn neighbours_8(
    row: usize,
    col: usize,
    h: usize,
    w: usize,
) -> impl Iterator<Item = (usize, usize)> {
    const OFFSETS: [(isize, isize); 8] = [
        (-1, -1),
        (-1, 0),
        (-1, 1),
        (0, -1),
        (0, 1),
        (1, -1),
        (1, 0),
        (1, 1),
    ];
    neighbours(row, col, h, w, &OFFSETS)
}

fn neighbours(
    row: usize,
    col: usize,
    h: usize,
    w: usize,
    offsets: &'static [(isize, isize)],
) -> impl Iterator<Item = (usize, usize)> {
    offsets.iter().filter_map(move |&(dr, dc)| {
        let r = row as isize + dr;
        let c = col as isize + dc;
        if r < 0 || c < 0 || r >= h as isize || c >= w as isize {
            None
        } else {
            Some((r as usize, c as usize))
        }
    })
}
