use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One chart-ready series: sampled dates plus index-aligned values.
///
/// The core computes and downsamples — the frontend just renders.
/// `None` values mark points where the series is undefined (e.g. the first
/// `window - 1` entries of a moving average).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    /// Legend label (e.g. "Closing Price", "100 Day MA")
    pub label: String,

    /// Sampled dates, index-aligned with `values`
    pub dates: Vec<NaiveDate>,

    /// Sampled values; `None` where the series is undefined
    pub values: Vec<Option<f64>>,
}

impl ChartSeries {
    pub fn new(label: impl Into<String>, dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            dates,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Shape of the dataset a local analysis was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Rows that survived CSV parsing
    pub total_rows: usize,

    /// First date in the series
    pub first_date: NaiveDate,

    /// Last date in the series
    pub last_date: NaiveDate,

    /// Rows in the training portion of the split
    pub train_size: usize,

    /// Rows in the test portion (what the metrics are computed over)
    pub test_size: usize,
}
