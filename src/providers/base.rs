use crate::errors::Result;
use crate::models::price::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Base trait for daily market-data sources
#[async_trait]
pub trait MarketDataProvider {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Fetch daily bars for `symbol` over the closed range [start, end].
    ///
    /// An unknown symbol or a range without trading days yields an empty
    /// series, not an error; only transport-level failures are errors.
    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;
}
