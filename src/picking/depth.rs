//! Depth buffer sampling policy.
//!
//! The cursor depth is read from a square window of the depth buffer. A
//! center sample at the far plane means the cursor points at empty space;
//! the smoothed (median) depth of the surrounding geometry is used instead.
//! While actively editing, the minimum (nearest) depth biases the result
//! towards foreground geometry. A raw zero anywhere in the window means the
//! window ran over the viewport border; the far plane is returned outright.

use ndarray::Array2;

/// Side length of the sampled depth window.
pub const DEPTH_WINDOW_SIZE: usize = 21;

/// Mask radius for the smoothed (median) depth.
const SMOOTHING_RADIUS: usize = 15;

/// Mask radius for the minimum (correction) depth.
const MIN_RADIUS: usize = 4;

fn contains_zero(depths: &Array2<f32>) -> bool {
    depths.iter().any(|&d| d == 0.0)
}

/// Samples within a circular mask of `radius` around the window center.
fn masked_samples(depths: &Array2<f32>, radius: usize) -> impl Iterator<Item = f32> + '_ {
    let center = depths.nrows() as isize / 2;
    let radius_sq = (radius * radius) as isize;
    depths.indexed_iter().filter_map(move |((row, col), &d)| {
        let dr = row as isize - center;
        let dc = col as isize - center;
        (dr * dr + dc * dc < radius_sq).then_some(d)
    })
}

/// Median depth of the valid (< far plane) samples around the center.
pub fn depth_smoothing(depths: &Array2<f32>) -> f64 {
    if contains_zero(depths) {
        return 1.0;
    }
    let mut valid: Vec<f32> = masked_samples(depths, SMOOTHING_RADIUS)
        .filter(|&d| d < 1.0)
        .collect();
    if valid.is_empty() {
        return 1.0;
    }
    valid.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = valid.len() / 2;
    if valid.len() % 2 == 1 {
        valid[mid] as f64
    } else {
        (valid[mid - 1] as f64 + valid[mid] as f64) / 2.0
    }
}

/// Minimum (closest) valid depth around the center.
pub fn depth_min(depths: &Array2<f32>) -> f64 {
    if contains_zero(depths) {
        return 1.0;
    }
    masked_samples(depths, MIN_RADIUS)
        .filter(|&d| d > 0.0 && d < 1.0)
        .fold(None, |best: Option<f32>, d| {
            Some(best.map_or(d, |b| b.min(d)))
        })
        .map_or(0.5, f64::from)
}
