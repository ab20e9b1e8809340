use super::{prediction_sentence, TAIL_HEADERS};
use crate::models::forecast::ForecastRecord;
use crate::models::price::PriceSeries;

/// 控制台输出用的尾部数据表，每个元素是一行
pub fn tail_lines(series: &PriceSeries, rows: usize) -> Vec<String> {
    let [date, open, high, low, close, volume] = TAIL_HEADERS;
    let mut lines = vec![
        format!("{:-<72}", ""),
        format!(
            "{:<12} {:<12} {:<12} {:<12} {:<12} {:<10}",
            date, open, high, low, close, volume
        ),
        format!("{:-<72}", ""),
    ];

    for bar in series.tail(rows) {
        lines.push(format!(
            "{:<12} {:<12.2} {:<12.2} {:<12.2} {:<12.2} {:<10}",
            bar.date.to_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }

    if series.len() > rows {
        lines.push(format!("... and {} earlier records", series.len() - rows));
    } else if series.is_empty() {
        lines.push("No daily data available".to_string());
    }

    lines
}

pub fn forecast_line(forecast: &ForecastRecord, currency: &str) -> String {
    format!(
        "{} (raw {:.6} on {})",
        prediction_sentence(forecast, currency),
        forecast.predicted_close,
        forecast.date
    )
}
