// 公开导出的模块，供外部使用
pub mod models;
pub mod data_provider;
pub mod errors;
pub mod forecast;
pub mod providers;
pub mod render;
pub mod services;
pub mod web;

// 主程序和集成测试需要，库使用场景中一般不直接调用
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod util;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use data_provider::{ExpiryPolicy, PriceDataProvider};
pub use errors::{ForecastError, Result};
pub use models::forecast::{FeatureRow, ForecastRecord};
pub use models::market::{Instrument, Market};
pub use models::price::{DailyBar, PriceSeries};
pub use services::{ForecastReport, ForecastService};
