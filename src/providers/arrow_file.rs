use crate::errors::Result;
use crate::models::price::PriceSeries;
use crate::providers::base::MarketDataProvider;
use crate::util::arrow_utils;
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{info, warn};
use std::path::PathBuf;

/// 离线数据源：读取 `price_forecast export` 生成的 `<SYMBOL>.arrow` 文件
pub struct ArrowFileProvider {
    data_dir: PathBuf,
}

impl ArrowFileProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.arrow", symbol))
    }
}

#[async_trait]
impl MarketDataProvider for ArrowFileProvider {
    fn name(&self) -> &'static str {
        "arrow-file"
    }

    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        if !path.exists() {
            warn!("No local data file for {} at {}", symbol, path.display());
            return Ok(PriceSeries::empty(symbol));
        }

        let series = arrow_utils::read_price_series_from_arrow(&path)?;
        let series = PriceSeries::new(symbol, series.within(start, end).bars);
        info!("Loaded {} daily records for {} from {}", series.len(), symbol, path.display());
        Ok(series)
    }
}
