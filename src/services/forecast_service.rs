use crate::config::Config;
use crate::data_provider::PriceDataProvider;
use crate::errors::{Result, ForecastError};
use crate::forecast::{features, predict_next_close};
use crate::models::forecast::{FeatureRow, ForecastRecord};
use crate::models::market::Market;
use crate::models::price::PriceSeries;
use crate::util;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;

/// 一次渲染所需的全部结果
#[derive(Debug, Clone, Serialize)]
pub struct ForecastReport {
    pub market: Market,
    pub symbol: String,
    pub currency: &'static str,
    pub series: Arc<PriceSeries>,
    pub features: Vec<FeatureRow>,
    pub forecast: ForecastRecord,
}

/// 预测服务：加载数据 -> 构造特征 -> 拟合 -> 预测
pub struct ForecastService {
    config: Config,
    provider: Arc<PriceDataProvider>,
}

impl ForecastService {
    pub fn new(config: Config, provider: Arc<PriceDataProvider>) -> Self {
        Self { config, provider }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &PriceDataProvider {
        &self.provider
    }

    /// 今天：配置固定的截止日，否则取市场时区的当前日期
    pub fn today(&self, market: Market) -> NaiveDate {
        self.config
            .end_date
            .unwrap_or_else(|| util::today_in(market.timezone()))
    }

    /// 通过缓存加载历史数据
    pub async fn load_series(&self, market: Market, ticker: &str) -> Result<Arc<PriceSeries>> {
        self.provider.load(ticker, self.today(market)).await
    }

    /// 在已加载的数据上拟合并预测
    pub fn forecast_series(&self, market: Market, series: Arc<PriceSeries>) -> Result<ForecastReport> {
        if series.is_empty() {
            warn!("No data available for {}", series.symbol);
            return Err(ForecastError::EmptyData(series.symbol.clone()));
        }

        let features = features::build_features(&series)?;
        let forecast = predict_next_close(&features, self.today(market), &self.config.gbm)
            .map_err(|e| match e {
                ForecastError::EmptyFeatures(_) => ForecastError::EmptyFeatures(series.symbol.clone()),
                other => other,
            })?;

        info!(
            "Forecast for {}: {}{:.2} on {}",
            series.symbol,
            market.currency_symbol(),
            forecast.predicted_close,
            forecast.date
        );

        Ok(ForecastReport {
            market,
            symbol: series.symbol.clone(),
            currency: market.currency_symbol(),
            series,
            features,
            forecast,
        })
    }

    /// 完整流程
    pub async fn run(&self, market: Market, ticker: &str) -> Result<ForecastReport> {
        let series = self.load_series(market, ticker).await?;
        self.forecast_series(market, series)
    }
}
