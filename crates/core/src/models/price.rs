use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One parsed OHLCV row of a stock's daily history.
///
/// `close` is guaranteed present: rows without a close (or without a
/// parseable date) are dropped during parsing, everything else is optional.
/// Points are immutable once parsed and keep their input (chronological)
/// order; no duplicate-date deduplication is performed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        }
    }
}
