use crate::errors::{Result, ForecastError};
use log::warn;
use serde::Serialize;

/// 单列标准化
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StandardScaler {
    mean: f64,
    scale: f64,
}

impl StandardScaler {
    /// 计算均值和总体标准差；方差为零时缩放系数取 1.0
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            return Err(ForecastError::EmptyFeatures(String::new()));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        let scale = if std > f64::EPSILON * mean.abs().max(1.0) {
            std
        } else {
            warn!("Zero variance in scaled column (mean {}), using unit scale", mean);
            1.0
        };

        Ok(Self { mean, scale })
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }
}
