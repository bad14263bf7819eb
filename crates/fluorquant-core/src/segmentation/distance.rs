use ndarray::Array2;

use super::mask::Mask;

/// Squared-distance stand-in for "no background seen yet".
const FAR: f64 = 1e20;

/// Exact Euclidean distance from every foreground pixel to the nearest
/// background pixel. Background pixels are 0.
///
/// Separable lower-envelope algorithm (Felzenszwalb & Huttenlocher): a 1D
/// squared-distance pass down each column followed by one along each row.
/// Pixels outside the image do not count as background, so an all-foreground
/// mask yields a uniform, very large distance.
pub fn distance_transform(mask: &Mask) -> Array2<f32> {
    let (h, w) = mask.dim();
    let mut sq = mask.data.mapv(|fg| if fg { FAR } else { 0.0 });
    if h == 0 || w == 0 {
        return sq.mapv(|v| v as f32);
    }

    let n = h.max(w);
    let mut f = vec![0.0f64; n];
    let mut d = vec![0.0f64; n];
    let mut v = vec![0usize; n];
    let mut z = vec![0.0f64; n + 1];

    for col in 0..w {
        for row in 0..h {
            f[row] = sq[[row, col]];
        }
        lower_envelope(&f[..h], &mut d[..h], &mut v, &mut z);
        for row in 0..h {
            sq[[row, col]] = d[row];
        }
    }

    for row in 0..h {
        for col in 0..w {
            f[col] = sq[[row, col]];
        }
        lower_envelope(&f[..w], &mut d[..w], &mut v, &mut z);
        for col in 0..w {
            sq[[row, col]] = d[col];
        }
    }

    sq.mapv(|v| v.sqrt() as f32)
}

/// 1D squared distance transform of the sampled function `f`.
fn lower_envelope(f: &[f64], d: &mut [f64], v: &mut [usize], z: &mut [f64]) {
    let n = f.len();
    let intersect = |q: usize, p: usize| -> f64 {
        let (qf, pf) = (q as f64, p as f64);
        ((f[q] + qf * qf) - (f[p] + pf * pf)) / (2.0 * qf - 2.0 * pf)
    };

    let mut k = 0usize;
    v[0] = 0;
    z[0] = f64::NEG_INFINITY;
    z[1] = f64::INFINITY;
    for q in 1..n {
        let mut s = intersect(q, v[k]);
        while s <= z[k] {
            k -= 1;
            s = intersect(q, v[k]);
        }
        k += 1;
        v[k] = q;
        z[k] = s;
        z[k + 1] = f64::INFINITY;
    }

    k = 0;
    for (q, out) in d.iter_mut().enumerate().take(n) {
        while z[k + 1] < q as f64 {
            k += 1;
        }
        let dq = q as f64 - v[k] as f64;
        *out = dq * dq + f[v[k]];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_background_pixel_gives_euclidean_distance() {
        let mut data = Array2::from_elem((5, 5), true);
        data[[0, 0]] = false;
        let dist = distance_transform(&Mask::new(data));
        assert_eq!(dist[[0, 0]], 0.0);
        assert!((dist[[3, 4]] - 5.0).abs() < 1e-5);
        assert!((dist[[1, 1]] - 2f32.sqrt()).abs() < 1e-5);
    }
}
