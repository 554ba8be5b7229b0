//! HTTP entry points
//!
//! Two request handlers wrap the extraction pipeline: one returns records as
//! JSON, the other streams an XLSX attachment. Both reject requests without
//! a `url` query parameter before any extraction work happens.

use crate::{evaluate_pool, export_xlsx, MenuService, ScrapeError};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<MenuService>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/fetch-menu", get(fetch_menu))
        .route("/fetch-menu-excel", get(fetch_menu_excel))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds and serves the router until the shutdown future resolves.
pub async fn serve(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ScrapeError> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ScrapeError::IoError(e.to_string()))
}

#[derive(Debug, Deserialize)]
struct FetchParams {
    url: Option<String>,
}

/// `GET /fetch-menu?url=` — records as a JSON array. An extraction that
/// finds nothing is still a success and returns `[]`.
async fn fetch_menu(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Response {
    let Some(url) = params.url else {
        return error_response(StatusCode::BAD_REQUEST, "URL parameter is required");
    };

    match state.service.fetch_menu(&url).await {
        Ok(records) => Json(records).into_response(),
        Err(ScrapeError::InvalidUrl(_)) => {
            error_response(StatusCode::BAD_REQUEST, "URL parameter is not a valid http(s) URL")
        }
        Err(e) => {
            error!("fetch-menu failed for {}: {}", url, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Extraction failed")
        }
    }
}

/// `GET /fetch-menu-excel?url=` — records as a downloadable workbook.
/// Unlike the JSON path, zero records here is a 404: there is nothing
/// worth downloading.
async fn fetch_menu_excel(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Response {
    let Some(url) = params.url else {
        return error_response(StatusCode::BAD_REQUEST, "URL parameter is required");
    };

    let records = match state.service.fetch_menu(&url).await {
        Ok(records) => records,
        Err(ScrapeError::InvalidUrl(_)) => {
            return error_response(StatusCode::BAD_REQUEST, "URL parameter is not a valid http(s) URL")
        }
        Err(e) => {
            error!("fetch-menu-excel failed for {}: {}", url, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Extraction failed");
        }
    };

    if records.is_empty() {
        return error_response(StatusCode::NOT_FOUND, "No data found");
    }

    let bytes = match export_xlsx(&records) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Export failed for {}: {}", url, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Export failed");
        }
    };
    state.service.metrics().record_export();

    // The workbook never touches disk; the response body is the only copy,
    // so there is no artifact left to clean up after the send.
    let filename = crate::export_filename();

    (
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    match state.service.pool() {
        Some(pool) => {
            let stats = pool.get_stats().await;
            let level = evaluate_pool(&stats);
            Json(json!({ "status": level, "pool": stats })).into_response()
        }
        None => Json(json!({ "status": "healthy" })).into_response(),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
