use crate::errors::{Result, ForecastError};
use crate::models::price::{DailyBar, PriceSeries};
use crate::providers::base::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime};
use log::{debug, info, warn};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const MIN_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    meta: Option<ChartMeta>,
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// Yahoo Finance 日线数据源
pub struct YahooProvider {
    client: Client,
    base_url: String,
    last_request: Mutex<Option<Instant>>,
}

impl YahooProvider {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            last_request: Mutex::new(None),
        })
    }

    /// 等待请求频率限制
    // 在锁内预留下一个发送时间点，并发请求依次间隔 MIN_INTERVAL
    async fn wait_for_rate_limit(&self) -> Instant {
        let slot = {
            let mut last = self.last_request.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = match *last {
                Some(prev) => (prev + MIN_INTERVAL).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        let now = Instant::now();
        if slot > now {
            debug!("Waiting {:?} to respect the Yahoo rate limit", slot - now);
            tokio::time::sleep_until(tokio::time::Instant::from_std(slot)).await;
        }
        slot
    }

    fn chart_url(&self, symbol: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ForecastError::InvalidParameter(format!("Invalid base url {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ForecastError::InvalidParameter(format!("Base url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(&["v8", "finance", "chart", symbol]);
        Ok(url)
    }

    /// 解析 chart 接口返回，没有结果时返回空序列
    pub(crate) fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries> {
        let response: ChartResponse = serde_json::from_str(body)?;

        if let Some(error) = response.chart.error {
            warn!("Yahoo returned {} for {}: {}", error.code, symbol, error.description);
            return Ok(PriceSeries::empty(symbol));
        }

        let Some(data) = response.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(PriceSeries::empty(symbol));
        };
        let (Some(timestamps), Some(quote)) = (data.timestamp, data.indicators.quote.first()) else {
            return Ok(PriceSeries::empty(symbol));
        };
        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

        let mut bars = Vec::with_capacity(timestamps.len());
        let mut skipped = 0;
        for (i, ts) in timestamps.iter().enumerate() {
            let cell = |col: &[Option<f64>]| col.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close)) =
                (cell(&quote.open), cell(&quote.high), cell(&quote.low), cell(&quote.close))
            else {
                skipped += 1;
                continue;
            };
            let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|dt| dt.date_naive()) else {
                skipped += 1;
                continue;
            };

            bars.push(DailyBar {
                date,
                open,
                high,
                low,
                close,
                // 指数没有成交量
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        if skipped > 0 {
            warn!("Skipped {} incomplete rows for {}", skipped, symbol);
        }

        Ok(PriceSeries::new(symbol, bars))
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_daily(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
        info!("Downloading {} daily data from {} to {}", symbol, start, end);

        self.wait_for_rate_limit().await;

        let url = self.chart_url(symbol)?;
        // period2 is exclusive on Yahoo's side
        let period1 = unix_seconds(start).to_string();
        let period2 = unix_seconds(end.succ_opt().unwrap_or(end)).to_string();
        debug!("GET {} period1={} period2={}", url, period1, period2);

        let response = self
            .client
            .get(url)
            .query(&[
                ("period1", period1.as_str()),
                ("period2", period2.as_str()),
                ("interval", "1d"),
            ])
            .send()
            .await?;

        let status = response.status();
        if status.is_server_error() {
            return Err(ForecastError::ProviderError(format!(
                "Yahoo chart request for {} failed: HTTP status {}", symbol, status
            )));
        }

        let text = response.text().await?;
        if status.is_client_error() {
            warn!("Yahoo chart request for {} returned HTTP status {}", symbol, status);
            return Ok(PriceSeries::empty(symbol));
        }

        let series = Self::parse_chart(symbol, &text)?;
        info!("Downloaded {} daily records for {}", series.len(), symbol);
        Ok(series)
    }
}
