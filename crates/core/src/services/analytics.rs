//! Pure time-series helpers: windowed moving average, deterministic
//! downsampling, and regression-quality metrics.
//!
//! All functions here are total over well-formed numeric input. Degenerate
//! cases (empty input, zero-variance series, oversized windows) produce
//! sentinel values — `None` entries or `NaN` — rather than errors; callers
//! interpret those as "insufficient data".

use crate::models::prediction::RegressionMetrics;

/// Trailing moving average over `prices`.
///
/// The output has the same length as the input. The first `window - 1`
/// entries are `None`: the window is never partially filled. From index
/// `window - 1` on, each entry is the arithmetic mean of the trailing
/// `window` prices (inclusive of the current index).
///
/// A window larger than the input yields an all-`None` output. `window == 0`
/// is a caller contract violation; the function stays total and also yields
/// all `None`.
#[must_use]
pub fn moving_average(prices: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; prices.len()];
    }

    (0..prices.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &prices[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

/// Indices to keep when reducing a series of `len` points to at most
/// `max_points` for chart rendering.
///
/// Identity when `len <= max_points` (every index kept). Otherwise the
/// stride is `ceil(len / max_points)` and indices `0, step, 2*step, …` are
/// kept; if the stride misses the final index it is appended, so the last
/// point of the series is always present. For degenerate lengths the
/// appended index can duplicate the previous one — that is the defined
/// behavior, not deduplicated.
///
/// The index form exists so several aligned series (close price and its
/// moving averages) can be sampled with one shared stride.
#[must_use]
pub fn sample_indices(len: usize, max_points: usize) -> Vec<usize> {
    if max_points == 0 || len <= max_points {
        return (0..len).collect();
    }

    let step = len.div_ceil(max_points);
    let mut indices: Vec<usize> = (0..len).step_by(step).collect();
    if indices.last() != Some(&(len - 1)) {
        indices.push(len - 1);
    }
    indices
}

/// Downsample `data` to at most roughly `max_points` entries, always keeping
/// the last one. One-shot lossy transform; see [`sample_indices`] for the
/// exact stride rules.
#[must_use]
pub fn downsample<T: Clone>(data: &[T], max_points: usize) -> Vec<T> {
    if data.len() <= max_points {
        return data.to_vec();
    }
    sample_indices(data.len(), max_points)
        .into_iter()
        .map(|i| data[i].clone())
        .collect()
}

/// Compare an actual and a predicted series over their common prefix.
///
/// `n = min(len)`; any excess tail on either side is silently ignored.
/// Returns MSE, RMSE, and R² = 1 - ssRes/ssTot.
///
/// `n == 0` yields `NaN` throughout (division by zero). A constant actual
/// series has `ssTot == 0`, so `r2` comes out non-finite (−∞ for a non-zero
/// residual, `NaN` otherwise); the value is propagated, never clamped.
#[must_use]
pub fn regression_metrics(actual: &[f64], predicted: &[f64]) -> RegressionMetrics {
    let n = actual.len().min(predicted.len());
    let n_f = n as f64;

    let mean_actual = actual[..n].iter().sum::<f64>() / n_f;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for i in 0..n {
        let err = actual[i] - predicted[i];
        ss_res += err * err;
        ss_tot += (actual[i] - mean_actual) * (actual[i] - mean_actual);
    }

    let mse = ss_res / n_f;
    RegressionMetrics {
        mse,
        rmse: mse.sqrt(),
        r2: 1.0 - ss_res / ss_tot,
    }
}
