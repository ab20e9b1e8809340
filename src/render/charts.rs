// Plotly 图表描述：`{"data": [...], "layout": {...}}`，由浏览器端 plotly.js 绘制

use serde_json::{json, Value};

use super::price_axis_title;
use crate::models::forecast::{FeatureRow, ForecastRecord};
use crate::models::price::PriceSeries;

fn layout(title: &str, currency: &str, range_slider: bool) -> Value {
    json!({
        "title": { "text": title },
        "xaxis": {
            "title": { "text": "Date" },
            "rangeslider": { "visible": range_slider },
        },
        "yaxis": { "title": { "text": price_axis_title(currency) } },
    })
}

fn forecast_trace(forecast: &ForecastRecord, name: &str, mode: &str) -> Value {
    json!({
        "type": "scatter",
        "mode": mode,
        "name": name,
        "x": [forecast.date.to_string()],
        "y": [forecast.predicted_close],
        "line": { "color": "royalblue" },
        "marker": { "color": "royalblue", "size": 10 },
    })
}

/// 历史开盘价/收盘价走势，带范围滑块
pub fn price_history_figure(series: &PriceSeries, currency: &str) -> Value {
    let dates: Vec<String> = series.bars.iter().map(|b| b.date.to_string()).collect();
    let opens: Vec<f64> = series.bars.iter().map(|b| b.open).collect();

    json!({
        "data": [
            { "type": "scatter", "mode": "lines", "name": "stock_open", "x": dates, "y": opens },
            { "type": "scatter", "mode": "lines", "name": "stock_close", "x": dates, "y": series.closes() },
        ],
        "layout": layout("Time Series data with Rangeslider", currency, true),
    })
}

/// 实际收盘价与预测点
pub fn forecast_figure(rows: &[FeatureRow], forecast: &ForecastRecord, currency: &str) -> Value {
    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();

    json!({
        "data": [
            { "type": "scatter", "mode": "lines", "name": "Actual Close", "x": dates, "y": closes },
            forecast_trace(forecast, "Predicted Close", "markers"),
        ],
        "layout": layout("Forecast plot", currency, true),
    })
}

/// 预测分解图
pub fn components_figure(rows: &[FeatureRow], forecast: &ForecastRecord, currency: &str) -> Value {
    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();

    json!({
        "data": [
            { "type": "scatter", "mode": "markers", "name": "Actual", "x": dates, "y": closes },
            forecast_trace(forecast, "Forecast", "lines+markers"),
        ],
        "layout": layout("Forecast components", currency, false),
    })
}
