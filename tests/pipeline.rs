mod common;

use common::{date, service, weekday_bars, StaticSource};
use egostrategy_forecast::forecast::gbm::GbmParams;
use egostrategy_forecast::providers::ArrowFileProvider;
use egostrategy_forecast::util::arrow_utils;
use egostrategy_forecast::{Config, ForecastError, ForecastService, Market, PriceDataProvider, PriceSeries};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn config() -> Config {
    // 2024-06-07 是周五
    Config::new().with_end_date(date("2024-06-07"))
}

#[tokio::test]
async fn rising_series_forecast_stays_near_recent_range() {
    let closes = [10.0, 11.0, 12.0, 13.0, 14.0];
    let source = Arc::new(StaticSource::default().with("AAPL", weekday_bars("2024-06-03", &closes)));
    let service = service(source, config());

    let report = service.run(Market::US, "AAPL").await.unwrap();

    assert_eq!(report.forecast.date, date("2024-06-10"));
    assert_eq!(report.features.len(), 5);
    assert_eq!(report.currency, "$");
    let predicted = report.forecast.predicted_close;
    assert!((10.0..=15.0).contains(&predicted), "predicted {}", predicted);
    assert!(predicted > 13.0, "last close should dominate, got {}", predicted);
}

#[tokio::test]
async fn empty_series_stops_before_forecasting() {
    let source = Arc::new(StaticSource::default());
    let service = service(Arc::clone(&source), config());

    let series = service.load_series(Market::India, "NOPE.NS").await.unwrap();
    assert!(series.is_empty());

    let err = service.forecast_series(Market::India, series).unwrap_err();
    assert!(matches!(err, ForecastError::EmptyData(ref s) if s == "NOPE.NS"));
    assert!(err.is_recoverable());
    assert!(err.to_string().starts_with("No data available for NOPE.NS"));
}

#[tokio::test]
async fn flat_series_predicts_the_constant() {
    let source = Arc::new(StaticSource::default().with("SPY", weekday_bars("2024-05-01", &[42.0; 20])));
    let service = service(source, config());

    let report = service.run(Market::US, "SPY").await.unwrap();
    assert!((report.forecast.predicted_close - 42.0).abs() < 1e-9);
}

#[tokio::test]
async fn single_bar_history_still_forecasts() {
    let source = Arc::new(StaticSource::default().with("TCS.NS", weekday_bars("2024-06-05", &[3900.0])));
    let service = service(source, config());

    let report = service.run(Market::India, "TCS.NS").await.unwrap();
    assert_eq!(report.currency, "₹");
    assert!((report.forecast.predicted_close - 3900.0).abs() < 1e-9);
}

#[tokio::test]
async fn forecast_is_deterministic_for_fixed_seed() {
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.1).collect();
    let bars = weekday_bars("2024-03-01", &closes);
    let params = GbmParams { subsample: 0.8, seed: 7, ..GbmParams::default() };

    let mut predictions = Vec::new();
    for _ in 0..2 {
        let source = Arc::new(StaticSource::default().with("MSFT", bars.clone()));
        let service = service(source, config().with_gbm(params.clone()));
        predictions.push(service.run(Market::US, "MSFT").await.unwrap().forecast.predicted_close);
    }

    assert_eq!(predictions[0], predictions[1]);
}

#[tokio::test]
async fn repeated_renders_fetch_once() {
    let source = Arc::new(StaticSource::default().with("AAPL", weekday_bars("2024-06-03", &[1.0, 2.0, 3.0])));
    let service = service(Arc::clone(&source), config());

    let first = service.run(Market::US, "AAPL").await.unwrap();
    let second = service.run(Market::US, "AAPL").await.unwrap();

    assert_eq!(source.calls(), 1);
    assert_eq!(first.forecast, second.forecast);
    assert!(Arc::ptr_eq(&first.series, &second.series));
}

#[tokio::test]
async fn history_before_start_date_is_ignored() {
    let bars = weekday_bars("2014-12-29", &[1.0, 2.0, 3.0, 4.0, 5.0]);
    let source = Arc::new(StaticSource::default().with("AAPL", bars));
    let service = service(source, config());

    let report = service.run(Market::US, "AAPL").await.unwrap();
    // 2014-12-29..31 在默认起始日期之前
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.series.bars[0].date, date("2015-01-01"));
}

#[tokio::test]
async fn exported_arrow_files_feed_the_offline_provider() {
    let dir = tempfile::tempdir().unwrap();
    let series = PriceSeries::new("INFY.NS", weekday_bars("2024-05-20", &[1500.0, 1510.0, 1505.0, 1520.0]));
    let provider = ArrowFileProvider::new(dir.path());
    arrow_utils::save_price_series_to_arrow(&series, &provider.path_for("INFY.NS")).unwrap();

    let config = config();
    let cache = PriceDataProvider::new(Arc::new(provider), config.start_date);
    let service = ForecastService::new(config, Arc::new(cache));

    let report = service.run(Market::India, "INFY.NS").await.unwrap();
    assert_eq!(report.series.bars, series.bars);
    assert_eq!(report.forecast.date, date("2024-06-10"));

    let missing = service.run(Market::India, "WIPRO.NS").await.unwrap_err();
    assert!(matches!(missing, ForecastError::EmptyData(_)));
}
