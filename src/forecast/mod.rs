pub mod features;
pub mod gbm;
pub mod scaler;
pub mod tree;

use chrono::NaiveDate;
use log::info;
use std::fmt::Debug;

use crate::errors::{Result, ForecastError};
use crate::models::forecast::{FeatureRow, ForecastRecord};
use crate::util::{date_to_ordinal, next_business_day};
use gbm::{GbmParams, GradientBoostingRegressor};
use scaler::StandardScaler;

/// 回归模型接口
pub trait Regressor: Debug {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;

    fn name(&self) -> &str;
}

/// 用全部历史拟合，预测 `today` 之后下一交易日的收盘价
// 标准化参数只在训练日序数上拟合一次，预测日沿用同一组参数
pub fn predict_next_close(rows: &[FeatureRow], today: NaiveDate, params: &GbmParams) -> Result<ForecastRecord> {
    let mut model = GradientBoostingRegressor::new(params.clone())?;
    predict_next_close_with(&mut model, rows, today)
}

pub fn predict_next_close_with<R: Regressor>(model: &mut R, rows: &[FeatureRow], today: NaiveDate) -> Result<ForecastRecord> {
    if rows.is_empty() {
        return Err(ForecastError::EmptyFeatures(String::new()));
    }

    let ordinals = features::ordinal_matrix(rows);
    let scaler = StandardScaler::fit(&ordinals)?;
    let x: Vec<Vec<f64>> = ordinals.iter().map(|o| vec![scaler.transform(*o)]).collect();
    let y = features::close_targets(rows);

    model.fit(&x, &y)?;

    let next_day = next_business_day(today);
    let next_scaled = scaler.transform(f64::from(date_to_ordinal(next_day)));
    let predicted_close = model
        .predict(&[vec![next_scaled]])?
        .first()
        .copied()
        .ok_or_else(|| ForecastError::ModelError("Model returned no prediction".to_string()))?;

    info!(
        "{} predicted {:.4} for {} from {} rows",
        model.name(),
        predicted_close,
        next_day,
        rows.len()
    );

    Ok(ForecastRecord {
        date: next_day,
        predicted_close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(closes: &[f64]) -> Vec<FeatureRow> {
        let start: NaiveDate = "2024-06-03".parse().unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let date = start + chrono::Duration::days(i as i64);
                FeatureRow { date, date_ordinal: date_to_ordinal(date), close: *c }
            })
            .collect()
    }

    #[test]
    fn forecast_date_is_next_business_day_after_today() {
        let friday: NaiveDate = "2024-06-07".parse().unwrap();
        let record = predict_next_close(&rows(&[1.0, 2.0, 3.0]), friday, &GbmParams::default()).unwrap();
        assert_eq!(record.date, "2024-06-10".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn single_row_history_still_predicts_its_close() {
        let today: NaiveDate = "2024-06-03".parse().unwrap();
        let record = predict_next_close(&rows(&[42.0]), today, &GbmParams::default()).unwrap();
        assert_eq!(record.predicted_close, 42.0);
    }

    #[test]
    fn empty_rows_are_rejected_before_fitting() {
        let today: NaiveDate = "2024-06-03".parse().unwrap();
        let err = predict_next_close(&[], today, &GbmParams::default()).unwrap_err();
        assert!(err.is_recoverable());
    }
}
