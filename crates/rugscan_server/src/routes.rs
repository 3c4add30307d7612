//! Routes, the caller guard and the cached report service.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, Request, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rugscan::news::collect_news;
use rugscan::upstream::clean_coin_id;
use rugscan::{report_key, CoinReport, NewsDigest, ScanRequest};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use time::OffsetDateTime;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

pub const API_KEY_HEADER: &str = "x-api-key";

pub fn router(state: Arc<AppState>) -> Router {
    let guarded = Router::new()
        .route("/fetchCoinData/:id", get(fetch_coin_data))
        .route("/report/:id", get(download_report))
        .route_layer(middleware::from_fn_with_state(state.clone(), guard));

    Router::new()
        .route("/config", get(client_config))
        .route("/fetchNews", get(fetch_news))
        .merge(guarded)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `client-ip`, else the first `x-forwarded-for` entry, else `"unknown"`.
pub fn caller_id(headers: &HeaderMap) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };
    header_str("client-ip")
        .or_else(|| {
            header_str("x-forwarded-for")
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        })
        .unwrap_or("unknown")
        .to_string()
}

/// Rate limit first, then the shared secret. Both run before any upstream call.
async fn guard(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    let caller = caller_id(request.headers());
    if !state.limiter.check(&caller) {
        warn!(caller = %caller, path = request.uri().path(), "rate limited");
        return ApiError::RateLimited.into_response();
    }
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if key != Some(state.client_api_key.as_str()) {
        warn!(caller = %caller, path = request.uri().path(), "rejected api key");
        return ApiError::Unauthorized.into_response();
    }
    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanParams {
    pub audit_link: Option<String>,
    pub bypass_cache: Option<String>,
}

impl ScanParams {
    fn bypass(&self) -> bool {
        self.bypass_cache.as_deref() == Some("true")
    }
}

/// Report body: the rendered fragment next to the report fields.
#[derive(Serialize)]
pub struct ReportResponse {
    pub html: String,
    #[serde(flatten)]
    pub report: CoinReport,
}

/// Cached report for `id`, scanning on a miss or when the caller asks to bypass.
async fn cached_report(state: &AppState, id: &str, params: ScanParams) -> Result<CoinReport, ApiError> {
    let started = Instant::now();
    let bypass = params.bypass();
    let req = ScanRequest::new(id).with_audit_link(params.audit_link);
    let key = report_key(
        &clean_coin_id(id),
        req.audit_link.as_deref().unwrap_or_default(),
    );

    if !bypass {
        if let Some(mut report) = state.cache.get(&key) {
            debug!(coin = id, "cache hit");
            report.stamp(OffsetDateTime::now_utc(), started.elapsed());
            return Ok(report);
        }
    }

    let report = state
        .aggregator
        .scan(&req)
        .await
        .map_err(ApiError::from_scan)?;
    state.cache.insert(key, report.clone());
    info!(coin = %report.coin.id, bypass, "report cached");
    Ok(report)
}

async fn fetch_coin_data(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ScanParams>,
) -> Result<Json<ReportResponse>, ApiError> {
    let report = cached_report(&state, &id, params).await?;
    Ok(Json(ReportResponse {
        html: rugscan_report::build_fragment(&report),
        report,
    }))
}

async fn download_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ScanParams>,
) -> Result<Response, ApiError> {
    let report = cached_report(&state, &id, params).await?;
    let html = rugscan_report::build_document(&report).map_err(|e| {
        warn!(coin = %id, error = %e, "render failed");
        ApiError::Internal(id.clone())
    })?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        rugscan_report::document_file_name(&report)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        html,
    )
        .into_response())
}

async fn client_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "apiKey": state.client_api_key }))
}

async fn fetch_news(State(state): State<Arc<AppState>>) -> Json<NewsDigest> {
    Json(collect_news(state.news.as_ref()).await)
}
