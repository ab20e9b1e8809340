use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::{error, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::ForecastError;
use crate::models::market::Market;
use crate::render::html::{render_page, FormState, Outcome};
use crate::services::{ForecastReport, ForecastService};

#[derive(Clone)]
pub struct AppState {
    service: Arc<ForecastService>,
}

impl AppState {
    pub fn new(service: Arc<ForecastService>) -> Self {
        Self { service }
    }
}

/// 查询参数：`?market=US&stock=Apple (AAPL)&ticker=INFY.NS`
#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub market: Option<String>,
    pub stock: Option<String>,
    pub ticker: Option<String>,
}

impl ForecastQuery {
    /// 未知市场回退到 US
    fn market(&self) -> Market {
        match self.market.as_deref().map(str::parse::<Market>) {
            Some(Ok(market)) => market,
            Some(Err(e)) => {
                warn!("{}, falling back to {}", e, Market::default());
                Market::default()
            }
            None => Market::default(),
        }
    }

    fn form_state(&self, market: Market) -> FormState {
        let stock = self
            .stock
            .as_deref()
            .and_then(|name| market.find_instrument(name))
            .unwrap_or_else(|| market.default_instrument());
        FormState {
            market,
            stock: stock.name.to_string(),
            custom_ticker: self.ticker.clone().unwrap_or_default(),
        }
    }

    fn ticker(&self, market: Market) -> String {
        market.resolve_ticker(self.stock.as_deref(), self.ticker.as_deref())
    }
}

impl IntoResponse for ForecastError {
    fn into_response(self) -> Response {
        let status = match &self {
            ForecastError::EmptyData(_) | ForecastError::EmptyFeatures(_) => StatusCode::NOT_FOUND,
            ForecastError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ForecastError::ProviderError(_) | ForecastError::RequestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/api/forecast", get(api_forecast))
        .route("/health", get(health))
        .with_state(state)
}

/// GET / 渲染看板页面
pub async fn dashboard(State(state): State<AppState>, Query(query): Query<ForecastQuery>) -> (StatusCode, Html<String>) {
    let market = query.market();
    let ticker = query.ticker(market);
    let form = query.form_state(market);
    let tail_rows = state.service.config().tail_rows;

    let series = match state.service.load_series(market, &ticker).await {
        Ok(series) => series,
        Err(e) => {
            error!("Failed to load {}: {}", ticker, e);
            let page = render_page(&form, &Outcome::Failed(e.to_string()), tail_rows);
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(page));
        }
    };

    match state.service.forecast_series(market, Arc::clone(&series)) {
        Ok(report) => (StatusCode::OK, Html(render_page(&form, &Outcome::Forecast(&report), tail_rows))),
        Err(e) if e.is_recoverable() => {
            let outcome = Outcome::Unavailable {
                series: Some(series.as_ref()),
                message: e.to_string(),
            };
            (StatusCode::OK, Html(render_page(&form, &outcome, tail_rows)))
        }
        Err(e) => {
            error!("Forecast for {} failed: {}", ticker, e);
            let page = render_page(&form, &Outcome::Failed(e.to_string()), tail_rows);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page))
        }
    }
}

/// GET /api/forecast 以 JSON 返回预测结果
pub async fn api_forecast(
    State(state): State<AppState>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastReport>, ForecastError> {
    if let Some(market) = query.market.as_deref() {
        market.parse::<Market>().map_err(ForecastError::InvalidParameter)?;
    }
    let market = query.market();
    let report = state.service.run(market, &query.ticker(market)).await?;
    Ok(Json(report))
}

/// GET /health 健康检查
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "cached_symbols": state.service.provider().cached_symbols().len(),
    }))
}
