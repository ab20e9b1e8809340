#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use egostrategy_forecast::providers::MarketDataProvider;
use egostrategy_forecast::{Config, DailyBar, ForecastService, PriceDataProvider, PriceSeries, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// In-memory provider: known symbols return their bars, anything else is empty
#[derive(Default)]
pub struct StaticSource {
    series: HashMap<String, Vec<DailyBar>>,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn with(mut self, symbol: &str, bars: Vec<DailyBar>) -> Self {
        self.series.insert(symbol.to_string(), bars);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketDataProvider for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let bars = self.series.get(symbol).cloned().unwrap_or_default();
        Ok(PriceSeries::new(symbol, bars).within(start, end))
    }
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

/// One bar per weekday starting at `first`, closing at the given prices.
pub fn weekday_bars(first: &str, closes: &[f64]) -> Vec<DailyBar> {
    let mut day = date(first);
    let mut bars = Vec::with_capacity(closes.len());
    for &close in closes {
        while matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            day += Duration::days(1);
        }
        bars.push(DailyBar {
            date: day,
            open: close - 0.5,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000_000,
        });
        day += Duration::days(1);
    }
    bars
}

pub fn service(source: Arc<StaticSource>, config: Config) -> ForecastService {
    let provider = PriceDataProvider::new(source, config.start_date).with_expiry(config.cache_expiry);
    ForecastService::new(config, Arc::new(provider))
}
