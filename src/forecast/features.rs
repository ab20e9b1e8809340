use crate::errors::{Result, ForecastError};
use crate::models::forecast::FeatureRow;
use crate::models::price::PriceSeries;
use crate::util::date_to_ordinal;

/// 日线 -> (日期, 日序数, 收盘价)，保持原有顺序，不去重不补缺
pub fn build_features(series: &PriceSeries) -> Result<Vec<FeatureRow>> {
    let rows: Vec<FeatureRow> = series
        .bars
        .iter()
        .map(|bar| FeatureRow {
            date: bar.date,
            date_ordinal: date_to_ordinal(bar.date),
            close: bar.close,
        })
        .collect();

    if rows.is_empty() {
        return Err(ForecastError::EmptyFeatures(series.symbol.clone()));
    }

    Ok(rows)
}

/// 单特征矩阵：每行只有日序数
pub fn ordinal_matrix(rows: &[FeatureRow]) -> Vec<f64> {
    rows.iter().map(|r| f64::from(r.date_ordinal)).collect()
}

pub fn close_targets(rows: &[FeatureRow]) -> Vec<f64> {
    rows.iter().map(|r| r.close).collect()
}
