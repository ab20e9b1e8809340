use serde_json::Value;
use std::fmt::Write;

use super::{charts, prediction_sentence, TAIL_HEADERS};
use crate::models::market::Market;
use crate::models::price::PriceSeries;
use crate::services::ForecastReport;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

const STYLE: &str = "body{background-color:#2d3436;color:white;font-family:sans-serif;max-width:960px;margin:0 auto;padding:1em}\
.title{text-align:center;font-weight:bold;font-size:2.5em;margin-bottom:1em}\
table{border-collapse:collapse;margin:0.5em 0}th,td{border:1px solid #636e72;padding:0.25em 0.75em;text-align:right}\
.error{background:#d63031;padding:0.75em;border-radius:4px}\
.prediction{text-align:center;font-size:24px}";

const ABOUT: &str = "Stock Price Prediction empower investors by providing precise predictions of stock prices \
through advanced machine learning algorithms. Our platform leverages state-of-the-art techniques to analyze \
historical data, forecast trends, and assist users in making informed investment decisions.";

/// 回显到页面的表单取值
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub market: Market,
    pub stock: String,
    pub custom_ticker: String,
}

/// 页面主体：预测结果、可提示的空数据，或渲染失败
pub enum Outcome<'a> {
    Forecast(&'a ForecastReport),
    Unavailable {
        series: Option<&'a PriceSeries>,
        message: String,
    },
    Failed(String),
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_form(out: &mut String, form: &FormState) {
    out.push_str("<form method=\"get\" action=\"/\">\n<p>Select market: ");
    for market in Market::ALL {
        let checked = if market == form.market { " checked" } else { "" };
        let _ = write!(
            out,
            "<label><input type=\"radio\" name=\"market\" value=\"{m}\" onchange=\"this.form.submit()\"{checked}> {m}</label> ",
            m = market
        );
    }
    out.push_str("</p>\n<p><label>Select dataset for prediction <select name=\"stock\">");
    for instrument in form.market.instruments() {
        let selected = if instrument.name == form.stock { " selected" } else { "" };
        let name = escape_html(instrument.name);
        let _ = write!(out, "<option value=\"{name}\"{selected}>{name}</option>");
    }
    let _ = write!(
        out,
        "</select></label></p>\n<p><label>Or enter a custom ticker (optional): \
         <input type=\"text\" name=\"ticker\" value=\"{}\"></label></p>\n\
         <p><button type=\"submit\">Predict</button></p>\n</form>\n",
        escape_html(&form.custom_ticker)
    );
}

/// 最近几条原始数据表格
pub fn tail_table(series: &PriceSeries, rows: usize) -> String {
    let mut out = String::from("<table><thead><tr>");
    for header in TAIL_HEADERS {
        let _ = write!(out, "<th>{}</th>", header);
    }
    out.push_str("</tr></thead><tbody>");
    for bar in series.tail(rows) {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{:.2}</td><td>{}</td></tr>",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        );
    }
    out.push_str("</tbody></table>\n");
    out
}

fn forecast_table(report: &ForecastReport) -> String {
    format!(
        "<table><thead><tr><th>Date</th><th>Predicted Close</th></tr></thead>\
         <tbody><tr><td>{}</td><td>{:.4}</td></tr></tbody></table>\n",
        report.forecast.date, report.forecast.predicted_close
    )
}

/// 图表容器及绘图脚本
fn chart(id: &str, figure: &Value) -> String {
    // "</" 不能出现在 <script> 内
    let figure_json = figure.to_string().replace("</", "<\\/");
    format!(
        "<div id=\"{id}\"></div>\n<script>(function(){{var f={figure_json};Plotly.newPlot(\"{id}\",f.data,f.layout);}})();</script>\n"
    )
}

fn render_raw_data(out: &mut String, series: Option<&PriceSeries>, rows: usize) {
    out.push_str("<h3>Raw data</h3>\n");
    match series {
        Some(series) => out.push_str(&tail_table(series, rows)),
        None => out.push_str("<p>No raw data loaded.</p>\n"),
    }
}

fn render_report(out: &mut String, report: &ForecastReport, rows: usize) {
    render_raw_data(out, Some(report.series.as_ref()), rows);
    out.push_str(&chart("price-history", &charts::price_history_figure(&report.series, report.currency)));

    out.push_str("<h3>Forecast data</h3>\n");
    out.push_str(&forecast_table(report));
    out.push_str(&chart(
        "forecast-plot",
        &charts::forecast_figure(&report.features, &report.forecast, report.currency),
    ));

    out.push_str("<p>Forecast components</p>\n");
    out.push_str(&chart(
        "forecast-components",
        &charts::components_figure(&report.features, &report.forecast, report.currency),
    ));

    let _ = write!(
        out,
        "<h3>Predicted Price</h3>\n<div class=\"prediction\">{}</div>\n",
        escape_html(&prediction_sentence(&report.forecast, report.currency))
    );
}

/// 渲染完整看板页面
pub fn render_page(form: &FormState, outcome: &Outcome<'_>, tail_rows: usize) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>Stock Price prediction</title><style>{STYLE}</style>\
         <script src=\"{PLOTLY_CDN}\"></script></head>\n<body>\n\
         <div class=\"title\">Stock Price prediction</div>\n\
         <h3>About Stock Price prediction</h3>\n<p>{ABOUT}</p>\n"
    );

    render_form(&mut out, form);

    match outcome {
        Outcome::Forecast(report) => render_report(&mut out, report, tail_rows),
        Outcome::Unavailable { series, message } => {
            render_raw_data(&mut out, *series, tail_rows);
            let _ = write!(out, "<div class=\"error\">{}</div>\n", escape_html(message));
        }
        Outcome::Failed(message) => {
            let _ = write!(
                out,
                "<div class=\"error\"><strong>Render failed.</strong><pre>{}</pre></div>\n",
                escape_html(message)
            );
        }
    }

    out.push_str("</body></html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forecast::{FeatureRow, ForecastRecord};
    use crate::models::price::DailyBar;
    use std::sync::Arc;

    fn report() -> ForecastReport {
        let bars: Vec<DailyBar> = (3..10)
            .map(|day| DailyBar {
                date: format!("2024-06-{:02}", day).parse().unwrap(),
                open: day as f64,
                high: day as f64 + 1.0,
                low: day as f64 - 1.0,
                close: day as f64 + 0.5,
                volume: 1000,
            })
            .collect();
        let features = bars
            .iter()
            .map(|b| FeatureRow { date: b.date, date_ordinal: 0, close: b.close })
            .collect();
        ForecastReport {
            market: Market::US,
            symbol: "AAPL".into(),
            currency: "$",
            series: Arc::new(PriceSeries::new("AAPL", bars)),
            features,
            forecast: ForecastRecord { date: "2024-06-10".parse().unwrap(), predicted_close: 9.75 },
        }
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_html("M&M.NS <b>\"x\"</b>"), "M&amp;M.NS &lt;b&gt;&quot;x&quot;&lt;/b&gt;");
    }

    #[test]
    fn tail_table_shows_last_rows_only() {
        let report = report();
        let table = tail_table(&report.series, 5);
        assert_eq!(table.matches("<tr><td>").count(), 5);
        assert!(!table.contains("2024-06-04"));
        assert!(table.contains("2024-06-09"));
    }

    #[test]
    fn forecast_page_has_all_panels() {
        let report = report();
        let page = render_page(&FormState::default(), &Outcome::Forecast(&report), 5);

        assert!(page.contains("Raw data"));
        assert!(page.contains("id=\"price-history\""));
        assert!(page.contains("Forecast data"));
        assert!(page.contains("id=\"forecast-plot\""));
        assert!(page.contains("id=\"forecast-components\""));
        assert!(page.contains("Predicted Close Price on Monday, 10-06-2024: $9.75"));
    }

    #[test]
    fn unavailable_page_shows_message_and_no_charts() {
        let empty = PriceSeries::empty("NOPE");
        let outcome = Outcome::Unavailable {
            series: Some(&empty),
            message: "No data available for NOPE.".into(),
        };
        let page = render_page(&FormState::default(), &outcome, 5);

        assert!(page.contains("class=\"error\">No data available for NOPE."));
        assert!(!page.contains("Plotly.newPlot"));
        assert!(!page.contains("Forecast data"));
    }

    #[test]
    fn form_echoes_selection_and_escapes_custom_ticker() {
        let form = FormState {
            market: Market::India,
            stock: "Nifty 50 (NIFTY.NS)".into(),
            custom_ticker: "\"><script>".into(),
        };
        let page = render_page(&form, &Outcome::Failed("boom".into()), 5);

        assert!(page.contains("value=\"India\" onchange=\"this.form.submit()\" checked"));
        assert!(page.contains("<option value=\"Nifty 50 (NIFTY.NS)\" selected>"));
        assert!(page.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(page.contains("Render failed."));
    }

    #[test]
    fn chart_script_cannot_close_its_tag() {
        let html = chart("x", &serde_json::json!({ "data": [], "layout": { "title": "</script>" } }));
        assert!(!html.contains("\"</script>\""));
    }
}
