// src/reports/stats.rs

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Quartiles {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
}

/// Arithmetic mean; 0 for an empty slice.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Sample standard deviation (n - 1); 0 when fewer than two values.
pub fn std_dev(xs: &[f64]) -> f64 {
    let n = xs.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Mean-rank percentile: `(below + 0.5 * equal) / n`, scaled to 0..=100.
pub fn percentile_rank(xs: &[f64], value: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let below = xs.iter().filter(|&&x| x < value).count() as f64;
    let equal = xs.iter().filter(|&&x| x == value).count() as f64;
    100.0 * (below + 0.5 * equal) / xs.len() as f64
}

/// Median-of-halves quartiles.
///
/// For odd `n` the middle element belongs to neither half; for even `n` the
/// halves split evenly. An empty half falls back to the median.
pub fn quartiles(xs: &[f64]) -> Quartiles {
    if xs.is_empty() {
        return Quartiles::default();
    }
    let sorted = sorted(xs);
    let n = sorted.len();
    let median = median_of_sorted(&sorted).unwrap_or(0.0);

    let lower = &sorted[..n / 2];
    let upper = if n % 2 == 1 {
        &sorted[n / 2 + 1..]
    } else {
        &sorted[n / 2..]
    };

    Quartiles {
        q1: median_of_sorted(lower).unwrap_or(median),
        median,
        q3: median_of_sorted(upper).unwrap_or(median),
    }
}

pub fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

pub fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

fn sorted(xs: &[f64]) -> Vec<f64> {
    let mut v = xs.to_vec();
    v.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    v
}

fn median_of_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}
