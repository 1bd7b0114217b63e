use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;

use super::traits::StockDataSource;
use crate::errors::CoreError;
use crate::models::price::PricePoint;

/// Local sample data: a directory of `<TICKER>.csv` files in the Yahoo
/// Finance daily-history export format.
///
/// Expected header: at least `Date` and `Close`; `Open`, `High`, `Low`,
/// `Adj Close` and `Volume` are optional. Rows with a missing or
/// unparseable `Date` or `Close` are dropped (Yahoo writes the literal
/// `null` for missing cells); other columns degrade to `None` per cell.
/// Row order is preserved — the exports are chronological.
#[derive(Debug, Clone)]
pub struct LocalCsvSource {
    dir: PathBuf,
}

impl LocalCsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.trim().to_uppercase()))
    }

    /// Parse a CSV stream into price points, dropping incomplete rows.
    pub fn parse_csv(input: impl Read) -> Result<Vec<PricePoint>, CoreError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);

        let date_col = column("Date").ok_or_else(|| {
            CoreError::InvalidData("CSV is missing the required `Date` column".to_string())
        })?;
        let close_col = column("Close").ok_or_else(|| {
            CoreError::InvalidData("CSV is missing the required `Close` column".to_string())
        })?;
        let open_col = column("Open");
        let high_col = column("High");
        let low_col = column("Low");
        let adj_close_col = column("Adj Close");
        let volume_col = column("Volume");

        let mut points = Vec::new();
        for record in reader.records() {
            let record = record?;

            let date = match record.get(date_col).and_then(parse_date) {
                Some(d) => d,
                None => continue,
            };
            let close = match record.get(close_col).and_then(parse_number) {
                Some(c) => c,
                None => continue,
            };

            let cell = |col: Option<usize>| col.and_then(|i| record.get(i)).and_then(parse_number);

            points.push(PricePoint {
                date,
                open: cell(open_col),
                high: cell(high_col),
                low: cell(low_col),
                close,
                adj_close: cell(adj_close_col),
                volume: cell(volume_col),
            });
        }

        Ok(points)
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), "%Y-%m-%d").ok()
}

fn parse_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return None;
    }
    trimmed.parse().ok()
}

#[async_trait]
impl StockDataSource for LocalCsvSource {
    fn name(&self) -> &str {
        "local-csv"
    }

    fn has_data(&self, ticker: &str) -> bool {
        self.csv_path(ticker).is_file()
    }

    fn available_tickers(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };
        let mut tickers: Vec<String> = entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().and_then(|e| e.to_str()) != Some("csv") {
                    return None;
                }
                Some(path.file_stem()?.to_str()?.to_uppercase())
            })
            .collect();
        tickers.sort();
        tickers
    }

    async fn fetch(&self, ticker: &str) -> Result<Vec<PricePoint>, CoreError> {
        let path = self.csv_path(ticker);
        if !path.is_file() {
            return Err(CoreError::NoData(ticker.trim().to_uppercase()));
        }
        let file = std::fs::File::open(&path)?;
        let points = Self::parse_csv(file)?;
        if points.is_empty() {
            return Err(CoreError::InvalidData(format!(
                "{} contains no usable rows",
                display_name(&path)
            )));
        }
        Ok(points)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<csv>")
        .to_string()
}
