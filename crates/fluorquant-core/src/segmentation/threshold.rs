use ndarray::Array2;

use crate::consts::OTSU_HISTOGRAM_BINS;

use super::config::ThresholdMethod;

/// Propose a threshold using the configured method.
pub fn suggest_threshold(data: &Array2<f32>, method: &ThresholdMethod, sigma_mul: f32) -> f32 {
    match method {
        ThresholdMethod::MeanPlusSigma => {
            let (mean, std) = compute_mean_stddev(data);
            (mean + sigma_mul as f64 * std) as f32
        }
        ThresholdMethod::Otsu => otsu_threshold(data),
        ThresholdMethod::Fixed(v) => *v,
    }
}

/// Compute mean and standard deviation of pixel values.
pub fn compute_mean_stddev(data: &Array2<f32>) -> (f64, f64) {
    let n = data.len() as f64;
    if n == 0.0 {
        return (0.0, 0.0);
    }
    let sum: f64 = data.iter().map(|&v| v as f64).sum();
    let mean = sum / n;
    let var: f64 = data.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Smallest and largest pixel value.
pub fn value_range(data: &Array2<f32>) -> (f32, f32) {
    data.iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}

/// Otsu's thresholding over the data's own [min, max] range.
///
/// Returns the lower edge of the first bin above the split, so that
/// `value >= threshold` selects exactly the upper class. A constant image
/// returns its single value.
pub fn otsu_threshold(data: &Array2<f32>) -> f32 {
    let (lo, hi) = value_range(data);
    if data.is_empty() || hi <= lo {
        return if data.is_empty() { 0.0 } else { lo };
    }

    let bins = OTSU_HISTOGRAM_BINS;
    let bin_width = (hi - lo) / bins as f32;
    let mut histogram = vec![0u64; bins];
    for &v in data.iter() {
        let bin = (((v - lo) / bin_width) as usize).min(bins - 1);
        histogram[bin] += 1;
    }

    lo + (otsu_split(&histogram) + 1) as f32 * bin_width
}

/// Last bin of the lower class at the split with the largest between-class
/// variance. Ties keep the lowest split.
fn otsu_split(histogram: &[u64]) -> usize {
    let total: u64 = histogram.iter().sum();
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &n)| i as f64 * n as f64)
        .sum();

    let (mut below, mut weighted_below) = (0u64, 0.0f64);
    let mut best = (0usize, 0.0f64);
    for (i, &n) in histogram.iter().enumerate() {
        below += n;
        weighted_below += i as f64 * n as f64;
        let above = total - below;
        if below == 0 {
            continue;
        }
        if above == 0 {
            break;
        }
        let (wb, wa) = (below as f64, above as f64);
        let spread = weighted_below / wb - (weighted_total - weighted_below) / wa;
        let variance = wb * wa * spread * spread;
        if variance > best.1 {
            best = (i, variance);
        }
    }
    best.0
}
