use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;

#[derive(Clone, Copy)]
enum Axis {
    Rows,
    Cols,
}

/// Apply Gaussian blur to a raster using separable 1D convolution.
///
/// The kernel radius is `ceil(3 * sigma)`; samples past the edge are clamped to
/// the nearest edge pixel. A non-positive sigma returns an unmodified copy.
pub fn gaussian_blur_array(data: &Array2<f32>, sigma: f32) -> Array2<f32> {
    if sigma <= 0.0 || data.is_empty() {
        return data.clone();
    }
    let kernel = make_gaussian_kernel(sigma);
    let row_pass = convolve(data, &kernel, Axis::Rows);
    convolve(&row_pass, &kernel, Axis::Cols)
}

fn make_gaussian_kernel(sigma: f32) -> Vec<f32> {
    let radius = (sigma * 3.0).ceil() as usize;
    let s2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..2 * radius + 1)
        .map(|i| {
            let x = i as f32 - radius as f32;
            (-x * x / s2).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel
}

fn convolve(data: &Array2<f32>, kernel: &[f32], axis: Axis) -> Array2<f32> {
    let (h, w) = data.dim();
    let radius = kernel.len() as isize / 2;

    let sample_row = |row: usize| -> Vec<f32> {
        (0..w)
            .map(|col| {
                kernel
                    .iter()
                    .enumerate()
                    .map(|(ki, &kv)| {
                        let offset = ki as isize - radius;
                        let v = match axis {
                            Axis::Rows => {
                                let c = (col as isize + offset).clamp(0, w as isize - 1);
                                data[[row, c as usize]]
                            }
                            Axis::Cols => {
                                let r = (row as isize + offset).clamp(0, h as isize - 1);
                                data[[r as usize, col]]
                            }
                        };
                        v * kv
                    })
                    .sum()
            })
            .collect()
    };

    let rows: Vec<Vec<f32>> = if h * w >= PARALLEL_PIXEL_THRESHOLD {
        (0..h).into_par_iter().map(sample_row).collect()
    } else {
        (0..h).map(sample_row).collect()
    };

    let mut result = Array2::<f32>::zeros((h, w));
    for (row, row_data) in rows.into_iter().enumerate() {
        for (col, val) in row_data.into_iter().enumerate() {
            result[[row, col]] = val;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized() {
        let k = make_gaussian_kernel(3.0);
        assert_eq!(k.len(), 19);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
    }
}
