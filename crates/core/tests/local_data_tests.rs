// ═══════════════════════════════════════════════════════════════════
// Local Data Tests — CSV parsing, LocalCsvSource, analysis pipeline
// ═══════════════════════════════════════════════════════════════════

use std::io::Cursor;

use chrono::NaiveDate;

use stock_portal_core::errors::CoreError;
use stock_portal_core::models::price::PricePoint;
use stock_portal_core::providers::local_csv::LocalCsvSource;
use stock_portal_core::providers::traits::StockDataSource;
use stock_portal_core::services::local_analysis::{analyze_series, AnalysisOptions};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// Build a synthetic daily history with the given closing prices.
fn history(closes: &[f64]) -> Vec<PricePoint> {
    let start = date("2020-01-01");
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint::new(start + chrono::Days::new(i as u64), close))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════
// CSV Parsing
// ═══════════════════════════════════════════════════════════════════

#[test]
fn parse_drops_rows_with_null_close() {
    let csv = "\
Date,Open,High,Low,Close,Adj Close,Volume
2020-01-01,9.5,10.5,9.0,10,10,1000
2020-01-02,10.0,11.0,9.8,null,null,1200
2020-01-03,11.0,12.5,10.9,12,12,900
";
    let points = LocalCsvSource::parse_csv(Cursor::new(csv)).unwrap();

    assert_eq!(points.len(), 2);
    assert_eq!(points[0].date, date("2020-01-01"));
    assert_eq!(points[0].close, 10.0);
    assert_eq!(points[1].date, date("2020-01-03"));
    assert_eq!(points[1].close, 12.0);
}

#[test]
fn parse_drops_rows_with_missing_or_bad_date() {
    let csv = "\
Date,Close
2020-01-01,10
,11
garbage,12
2020-01-04,13
";
    let points = LocalCsvSource::parse_csv(Cursor::new(csv)).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1].date, date("2020-01-04"));
}

#[test]
fn parse_keeps_optional_columns_per_cell() {
    let csv = "\
Date,Open,High,Low,Close,Adj Close,Volume
2020-01-01,9.5,,9.0,10,null,1000
";
    let points = LocalCsvSource::parse_csv(Cursor::new(csv)).unwrap();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].open, Some(9.5));
    assert_eq!(points[0].high, None);
    assert_eq!(points[0].low, Some(9.0));
    assert_eq!(points[0].adj_close, None);
    assert_eq!(points[0].volume, Some(1000.0));
}

#[test]
fn parse_works_without_optional_columns() {
    let csv = "Date,Close\n2020-01-01,10\n2020-01-02,11\n";
    let points = LocalCsvSource::parse_csv(Cursor::new(csv)).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].open, None);
    assert_eq!(points[0].volume, None);
}

#[test]
fn parse_requires_date_and_close_columns() {
    let missing_close = "Date,Open\n2020-01-01,9.5\n";
    assert!(matches!(
        LocalCsvSource::parse_csv(Cursor::new(missing_close)),
        Err(CoreError::InvalidData(_))
    ));

    let missing_date = "Close\n10\n";
    assert!(matches!(
        LocalCsvSource::parse_csv(Cursor::new(missing_date)),
        Err(CoreError::InvalidData(_))
    ));
}

#[test]
fn parse_preserves_input_order_without_dedup() {
    let csv = "\
Date,Close
2020-01-02,11
2020-01-01,10
2020-01-01,10
";
    let points = LocalCsvSource::parse_csv(Cursor::new(csv)).unwrap();
    // Order is significant; duplicates are kept as-is.
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].date, date("2020-01-02"));
    assert_eq!(points[1].date, points[2].date);
}

// ═══════════════════════════════════════════════════════════════════
// LocalCsvSource
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn source_finds_tickers_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("TSLA.csv"),
        "Date,Close\n2020-01-01,10\n2020-01-02,11\n",
    )
    .unwrap();

    let source = LocalCsvSource::new(dir.path());
    assert!(source.has_data("TSLA"));
    assert!(source.has_data("tsla"));
    assert!(source.has_data("  tsla  "));
    assert!(!source.has_data("AAPL"));

    let points = source.fetch("tsla").await.unwrap();
    assert_eq!(points.len(), 2);
}

#[tokio::test]
async fn source_lists_available_tickers_sorted() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["TSLA.csv", "AAPL.csv", "notes.txt"] {
        std::fs::write(dir.path().join(name), "Date,Close\n2020-01-01,1\n").unwrap();
    }

    let source = LocalCsvSource::new(dir.path());
    assert_eq!(source.available_tickers(), vec!["AAPL", "TSLA"]);
}

#[tokio::test]
async fn source_missing_ticker_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let source = LocalCsvSource::new(dir.path());
    assert!(matches!(
        source.fetch("MSFT").await,
        Err(CoreError::NoData(t)) if t == "MSFT"
    ));
}

#[tokio::test]
async fn source_rejects_file_with_no_usable_rows() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("EMPT.csv"),
        "Date,Close\n2020-01-01,null\n",
    )
    .unwrap();

    let source = LocalCsvSource::new(dir.path());
    assert!(matches!(
        source.fetch("EMPT").await,
        Err(CoreError::InvalidData(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════
// Analysis Pipeline
// ═══════════════════════════════════════════════════════════════════

#[test]
fn analyze_produces_aligned_full_history_series() {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64 * 0.5).collect();
    let points = history(&closes);
    let analysis = analyze_series(&points, &AnalysisOptions::default()).unwrap();

    // 400 rows fit under the 500-point cap: identity sampling.
    assert_eq!(analysis.close.len(), 400);
    assert_eq!(analysis.ma_short.len(), 400);
    assert_eq!(analysis.ma_long.len(), 400);
    assert_eq!(analysis.close.dates, analysis.ma_short.dates);

    // MA prefixes: undefined until the window fills.
    assert_eq!(analysis.ma_short.values[98], None);
    assert!(analysis.ma_short.values[99].is_some());
    assert_eq!(analysis.ma_long.values[198], None);
    assert!(analysis.ma_long.values[199].is_some());

    // Linear input: the 100-day MA at index 99 is the mean of 100..=149.5 steps.
    let expected = (0..100).map(|i| 100.0 + i as f64 * 0.5).sum::<f64>() / 100.0;
    assert!((analysis.ma_short.values[99].unwrap() - expected).abs() < 1e-9);
}

#[test]
fn analyze_downsamples_long_histories_keeping_last_date() {
    let closes: Vec<f64> = (0..2687).map(|i| 50.0 + (i as f64 * 0.01).sin()).collect();
    let points = history(&closes);
    let analysis = analyze_series(&points, &AnalysisOptions::default()).unwrap();

    assert!(analysis.close.len() <= 501);
    assert!(analysis.close.len() < closes.len());
    assert_eq!(
        analysis.close.dates.last(),
        Some(&points.last().unwrap().date)
    );
    assert_eq!(
        analysis.close.values.last().copied().flatten(),
        Some(*closes.last().unwrap())
    );
}

#[test]
fn analyze_split_sizes_follow_train_fraction() {
    let closes: Vec<f64> = (0..400).map(|i| 100.0 + i as f64).collect();
    let points = history(&closes);
    let analysis = analyze_series(&points, &AnalysisOptions::default()).unwrap();

    assert_eq!(analysis.info.total_rows, 400);
    assert_eq!(analysis.info.train_size, 280);
    assert_eq!(analysis.info.test_size, 120);
    assert_eq!(analysis.info.first_date, points[0].date);
    assert_eq!(analysis.info.last_date, points[399].date);
    assert_eq!(analysis.actual.len(), 120);
    assert_eq!(analysis.actual.dates, analysis.forecast.dates);
}

#[test]
fn analyze_forecast_is_trailing_mean_of_lag_window() {
    let closes: Vec<f64> = (0..200).map(|i| i as f64).collect();
    let points = history(&closes);
    let analysis = analyze_series(&points, &AnalysisOptions::default()).unwrap();

    // split = 140; first forecast value = mean of closes[90..140] = 114.5
    let first = analysis.forecast.values[0].unwrap();
    let expected = (90..140).map(|i| i as f64).sum::<f64>() / 50.0;
    assert!((first - expected).abs() < 1e-9, "got {first}");
}

#[test]
fn analyze_metrics_are_finite_for_varied_input() {
    let closes: Vec<f64> = (0..300)
        .map(|i| 100.0 + (i as f64 * 0.1).sin() * 5.0 + i as f64 * 0.2)
        .collect();
    let points = history(&closes);
    let analysis = analyze_series(&points, &AnalysisOptions::default()).unwrap();

    assert!(analysis.metrics.mse.is_finite());
    assert!(analysis.metrics.rmse.is_finite());
    assert!(analysis.metrics.r2.is_finite());
    assert!(analysis.metrics.mse >= 0.0);
    assert!((analysis.metrics.rmse - analysis.metrics.mse.sqrt()).abs() < 1e-9);
}

#[test]
fn analyze_constant_history_propagates_non_finite_r2() {
    let points = history(&vec![42.0; 300]);
    let analysis = analyze_series(&points, &AnalysisOptions::default()).unwrap();

    // Zero variance in the test tail: the degenerate r2 is surfaced as-is.
    assert!(!analysis.metrics.r2.is_finite());
    assert!((analysis.metrics.mse - 0.0).abs() < 1e-9);
}

#[test]
fn analyze_rejects_tiny_histories() {
    assert!(matches!(
        analyze_series(&history(&[10.0]), &AnalysisOptions::default()),
        Err(CoreError::InvalidData(_))
    ));
    assert!(matches!(
        analyze_series(&[], &AnalysisOptions::default()),
        Err(CoreError::InvalidData(_))
    ));
}

#[test]
fn analyze_validates_options() {
    let points = history(&(0..100).map(|i| i as f64).collect::<Vec<_>>());
    let bad_lag = AnalysisOptions {
        lag_window: 0,
        ..AnalysisOptions::default()
    };
    assert!(matches!(
        analyze_series(&points, &bad_lag),
        Err(CoreError::Validation(_))
    ));

    let bad_fraction = AnalysisOptions {
        train_fraction: 1.0,
        ..AnalysisOptions::default()
    };
    assert!(matches!(
        analyze_series(&points, &bad_fraction),
        Err(CoreError::Validation(_))
    ));
}
