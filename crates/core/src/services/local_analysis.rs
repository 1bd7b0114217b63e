use crate::errors::CoreError;
use crate::models::chart::{ChartSeries, DatasetInfo};
use crate::models::prediction::LocalAnalysis;
use crate::models::price::PricePoint;
use crate::services::analytics::{moving_average, regression_metrics, sample_indices};

/// Tuning knobs for the local analysis pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOptions {
    /// Short moving-average window, in trading days
    pub short_window: usize,

    /// Long moving-average window, in trading days
    pub long_window: usize,

    /// Upper bound on points per chart series after downsampling
    pub max_chart_points: usize,

    /// Fraction of rows assigned to the training side of the split
    pub train_fraction: f64,

    /// Trailing window of the naive forecast, in trading days
    pub lag_window: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            short_window: 100,
            long_window: 200,
            max_chart_points: 500,
            train_fraction: 0.7,
            lag_window: 50,
        }
    }
}

/// Turn a parsed price history into chart-ready series and fit metrics.
///
/// The pipeline: moving averages over the close series, one shared
/// downsampling stride for the full-history series (so close and both MAs
/// stay index-aligned), a train/test split, a naive trailing-mean forecast
/// over the test tail, and regression metrics of that forecast.
///
/// The forecast is an explicitly naive baseline — a lagged moving average,
/// not a model. It exists so the local path can render the same
/// original-vs-predicted comparison the backend produces.
pub fn analyze_series(
    points: &[PricePoint],
    options: &AnalysisOptions,
) -> Result<LocalAnalysis, CoreError> {
    if options.lag_window == 0 || options.max_chart_points == 0 {
        return Err(CoreError::Validation(
            "lag_window and max_chart_points must be positive".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&options.train_fraction) {
        return Err(CoreError::Validation(
            "train_fraction must lie in [0, 1)".to_string(),
        ));
    }

    let total_rows = points.len();
    let split = (total_rows as f64 * options.train_fraction).floor() as usize;
    if total_rows < 2 || split == 0 {
        return Err(CoreError::InvalidData(format!(
            "not enough rows for a train/test split: {total_rows}"
        )));
    }

    let dates: Vec<_> = points.iter().map(|p| p.date).collect();
    let closes: Vec<f64> = points.iter().map(|p| p.close).collect();

    let ma_short = moving_average(&closes, options.short_window);
    let ma_long = moving_average(&closes, options.long_window);

    // One stride for the full-history series keeps them index-aligned.
    let indices = sample_indices(total_rows, options.max_chart_points);
    let sampled_dates: Vec<_> = indices.iter().map(|&i| dates[i]).collect();
    let sampled = |values: &[Option<f64>]| indices.iter().map(|&i| values[i]).collect();

    let close_series = ChartSeries::new(
        "Closing Price",
        sampled_dates.clone(),
        indices.iter().map(|&i| Some(closes[i])).collect(),
    );
    let ma_short_series = ChartSeries::new(
        format!("{} Day MA", options.short_window),
        sampled_dates.clone(),
        sampled(&ma_short),
    );
    let ma_long_series = ChartSeries::new(
        format!("{} Day MA", options.long_window),
        sampled_dates,
        sampled(&ma_long),
    );

    // Train/test split; the test tail is what the forecast is judged on.
    let test_prices = &closes[split..];
    let forecast = lagged_forecast(&closes, split, options.lag_window);
    let metrics = regression_metrics(test_prices, &forecast);

    let test_indices = sample_indices(test_prices.len(), options.max_chart_points);
    let test_dates: Vec<_> = test_indices.iter().map(|&i| dates[split + i]).collect();
    let actual_series = ChartSeries::new(
        "Original Price",
        test_dates.clone(),
        test_indices.iter().map(|&i| Some(test_prices[i])).collect(),
    );
    let forecast_series = ChartSeries::new(
        "Predicted Price",
        test_dates,
        test_indices.iter().map(|&i| Some(forecast[i])).collect(),
    );

    Ok(LocalAnalysis {
        close: close_series,
        ma_short: ma_short_series,
        ma_long: ma_long_series,
        actual: actual_series,
        forecast: forecast_series,
        metrics,
        info: DatasetInfo {
            total_rows,
            first_date: dates[0],
            last_date: dates[total_rows - 1],
            train_size: split,
            test_size: total_rows - split,
        },
    })
}

/// Naive forecast for the test tail: the mean of the trailing `lag` closes
/// ending just before each test index. Early test indices reach back into
/// the training tail; the window is clamped at the start of the series.
fn lagged_forecast(closes: &[f64], split: usize, lag: usize) -> Vec<f64> {
    (0..closes.len() - split)
        .map(|i| {
            let end = split + i;
            let start = end.saturating_sub(lag);
            let window = &closes[start..end];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}
