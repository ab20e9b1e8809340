use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 训练样本
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    /// 公历日序数，0001-01-01 为 1
    pub date_ordinal: i32,
    pub close: f64,
}

/// 下一交易日的预测结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub date: NaiveDate,
    pub predicted_close: f64,
}
