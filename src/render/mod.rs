pub mod charts;
pub mod html;
pub mod text;

use crate::models::forecast::ForecastRecord;
use crate::util::format_long_date;

pub const TAIL_HEADERS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// 预测结论，如 `Predicted Close Price on Monday, 20-10-2026: $123.45`
pub fn prediction_sentence(forecast: &ForecastRecord, currency: &str) -> String {
    format!(
        "Predicted Close Price on {}: {}{:.2}",
        format_long_date(forecast.date),
        currency,
        forecast.predicted_close
    )
}

pub fn price_axis_title(currency: &str) -> String {
    format!("Price ({})", currency)
}
