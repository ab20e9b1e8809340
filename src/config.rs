use chrono::NaiveDate;
use std::time::Duration;

use crate::data_provider::ExpiryPolicy;
use crate::forecast::gbm::GbmParams;

pub const DEFAULT_START_DATE: &str = "2015-01-01";
pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub start_date: NaiveDate,
    /// 固定的截止日期；为空时取市场时区的今天
    pub end_date: Option<NaiveDate>,
    pub bind: String,
    pub cache_expiry: ExpiryPolicy,
    pub request_timeout: Duration,
    pub yahoo_base_url: String,
    pub tail_rows: usize,
    pub gbm: GbmParams,
}

impl Config {
    pub fn new() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default(),
            end_date: None,
            bind: DEFAULT_BIND.to_string(),
            cache_expiry: ExpiryPolicy::Never,
            request_timeout: Duration::from_secs(30),
            yahoo_base_url: DEFAULT_YAHOO_BASE_URL.to_string(),
            tail_rows: 5,
            gbm: GbmParams::default(),
        }
    }

    pub fn with_start_date(mut self, start: NaiveDate) -> Self {
        self.start_date = start;
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn with_bind(mut self, bind: &str) -> Self {
        self.bind = bind.to_string();
        self
    }

    pub fn with_cache_expiry(mut self, expiry: ExpiryPolicy) -> Self {
        self.cache_expiry = expiry;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_yahoo_base_url(mut self, url: &str) -> Self {
        self.yahoo_base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_tail_rows(mut self, rows: usize) -> Self {
        self.tail_rows = rows;
        self
    }

    pub fn with_gbm(mut self, params: GbmParams) -> Self {
        self.gbm = params;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_dashboard() {
        let config = Config::new();
        assert_eq!(config.start_date.to_string(), DEFAULT_START_DATE);
        assert_eq!(config.end_date, None);
        assert_eq!(config.cache_expiry, ExpiryPolicy::Never);
        assert_eq!(config.tail_rows, 5);
        assert_eq!(config.gbm.n_estimators, 100);
    }

    #[test]
    fn builders_override_fields() {
        let config = Config::new()
            .with_bind("0.0.0.0:9000")
            .with_yahoo_base_url("http://localhost:1234/")
            .with_cache_expiry(ExpiryPolicy::After(Duration::from_secs(60)));
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.yahoo_base_url, "http://localhost:1234");
        assert_eq!(config.cache_expiry, ExpiryPolicy::After(Duration::from_secs(60)));
    }
}
