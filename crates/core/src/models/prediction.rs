use serde::{Deserialize, Serialize};

use super::chart::{ChartSeries, DatasetInfo};

/// Regression-quality metrics comparing an actual and a predicted series.
///
/// All three fields may be non-finite for degenerate input: an empty
/// comparison yields `NaN` throughout, and a zero-variance actual series
/// yields a non-finite `r2` (−∞ or `NaN`). The values are propagated as-is,
/// never clamped — callers must check `is_finite()` before display.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Mean squared error
    pub mse: f64,

    /// Root mean squared error
    pub rmse: f64,

    /// Coefficient of determination: 1 - ssRes/ssTot
    pub r2: f64,
}

/// A prediction produced by the backend `/predict/` endpoint.
///
/// The plot fields are URLs (resolved against the configured backend root,
/// unless the backend already sent an absolute or `data:` URL).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemotePrediction {
    pub metrics: RegressionMetrics,
    pub plot_img: String,
    pub plot_100_dma: String,
    pub plot_200_dma: String,
    pub plot_prediction: String,
}

/// A full analysis computed locally from a CSV sample file.
///
/// The closing price and both moving averages are sampled with one shared
/// stride, so they stay index-aligned; the actual/forecast pair covers only
/// the test portion of the train/test split and is sampled independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAnalysis {
    /// Sampled closing price over the full history
    pub close: ChartSeries,

    /// Sampled short (100-day) moving average, aligned with `close`
    pub ma_short: ChartSeries,

    /// Sampled long (200-day) moving average, aligned with `close`
    pub ma_long: ChartSeries,

    /// Sampled actual closing price over the test split
    pub actual: ChartSeries,

    /// Sampled naive forecast over the test split, aligned with `actual`
    pub forecast: ChartSeries,

    /// Fit quality of the forecast against the test split
    pub metrics: RegressionMetrics,

    /// Shape of the underlying dataset
    pub info: DatasetInfo,
}

/// Outcome of the dashboard prediction flow: local sample data when
/// available, otherwise the remote backend's prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PredictionReport {
    Local(LocalAnalysis),
    Remote(RemotePrediction),
}

impl PredictionReport {
    /// The metrics, regardless of where the prediction came from.
    #[must_use]
    pub fn metrics(&self) -> &RegressionMetrics {
        match self {
            PredictionReport::Local(a) => &a.metrics,
            PredictionReport::Remote(p) => &p.metrics,
        }
    }
}
