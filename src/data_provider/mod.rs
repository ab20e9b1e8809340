use chrono::NaiveDate;
use log::{debug, info};

use crate::models::price::PriceSeries;
use crate::errors::Result;
use crate::providers::MarketDataProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// 缓存过期策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryPolicy {
    /// 进程存活期间一直有效
    #[default]
    Never,
    After(Duration),
}

impl ExpiryPolicy {
    fn is_expired(&self, fetched_at: Instant) -> bool {
        match self {
            ExpiryPolicy::Never => false,
            ExpiryPolicy::After(ttl) => fetched_at.elapsed() >= *ttl,
        }
    }
}

struct CachedSeries {
    series: Arc<PriceSeries>,
    fetched_at: Instant,
}

/// 价格数据提供者：按代码缓存数据源的返回结果
// 缓存键只有代码本身，不含截止日期；是否重新获取由过期策略决定
pub struct PriceDataProvider {
    source: Arc<dyn MarketDataProvider + Send + Sync>,
    start: NaiveDate,
    expiry: ExpiryPolicy,
    cache: Mutex<HashMap<String, CachedSeries>>,
}

impl PriceDataProvider {
    pub fn new(source: Arc<dyn MarketDataProvider + Send + Sync>, start: NaiveDate) -> Self {
        Self {
            source,
            start,
            expiry: ExpiryPolicy::Never,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.expiry = expiry;
        self
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedSeries>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, ticker: &str) -> Option<Arc<PriceSeries>> {
        self.entries()
            .get(ticker)
            .filter(|entry| !self.expiry.is_expired(entry.fetched_at))
            .map(|entry| Arc::clone(&entry.series))
    }

    /// 加载 [start, end] 的数据，未命中缓存时才访问数据源
    // 空结果也缓存，失败不缓存
    pub async fn load(&self, ticker: &str, end: NaiveDate) -> Result<Arc<PriceSeries>> {
        if let Some(series) = self.cached(ticker) {
            debug!("Cache hit for {} ({} records)", ticker, series.len());
            return Ok(series);
        }

        info!("Loading data for {} from {}", ticker, self.source.name());
        let series = Arc::new(self.source.fetch_daily(ticker, self.start, end).await?);

        self.entries().insert(
            ticker.to_string(),
            CachedSeries {
                series: Arc::clone(&series),
                fetched_at: Instant::now(),
            },
        );

        Ok(series)
    }

    /// 当前缓存中的代码
    pub fn cached_symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.entries().keys().cloned().collect();
        symbols.sort();
        symbols
    }
}
