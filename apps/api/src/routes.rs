//! # HTTP Routes
//!
//! ```text
//! POST /checkout       body { "items": [{ "product_id", "quantity" }] }  → 201 Transaction
//! GET  /report         ?start_date=YYYY-MM-DD&end_date=YYYY-MM-DD       → 200 SalesReport
//! GET  /report/today                                                     → 200 SalesReport
//! GET  /health                                                           → 200 | 503
//! ```
//!
//! Report days are UTC calendar days; a missing bound means today.

use std::time::{Duration, Instant};

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use kasir_core::{CheckoutRequest, SalesReport, Transaction};
use kasir_db::{CheckoutStore, SalesReportSource};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Builds the application router.
pub fn router<C, R>(state: AppState<C, R>) -> Router
where
    C: CheckoutStore + 'static,
    R: SalesReportSource + 'static,
{
    Router::new()
        .route("/checkout", post(checkout::<C, R>))
        .route("/report", get(report::<C, R>))
        .route("/report/today", get(report_today::<C, R>))
        .route("/health", get(health::<C, R>))
        .layer(middleware::from_fn(trace_request))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn checkout<C, R>(
    State(state): State<AppState<C, R>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Transaction>), ApiError>
where
    C: CheckoutStore + 'static,
    R: SalesReportSource + 'static,
{
    let Json(request) = payload?;
    let transaction = state.engine.checkout(&request.items).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn report<C, R>(
    State(state): State<AppState<C, R>>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<SalesReport>, ApiError>
where
    C: CheckoutStore + 'static,
    R: SalesReportSource + 'static,
{
    let Query(query) = query?;
    let today = Utc::now().date_naive();
    let report = state
        .reports
        .report_from_query(query.start_date.as_deref(), query.end_date.as_deref(), today)
        .await?;
    Ok(Json(report))
}

async fn report_today<C, R>(
    State(state): State<AppState<C, R>>,
) -> Result<Json<SalesReport>, ApiError>
where
    C: CheckoutStore + 'static,
    R: SalesReportSource + 'static,
{
    let report = state.reports.report_for_day(Utc::now().date_naive()).await?;
    Ok(Json(report))
}

async fn health<C, R>(State(state): State<AppState<C, R>>) -> (StatusCode, Json<Value>)
where
    C: CheckoutStore + 'static,
    R: SalesReportSource + 'static,
{
    match state.engine.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => {
            warn!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(json!({ "ok": false })))
        }
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Wraps each request in a span carrying a fresh request id.
async fn trace_request(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!(
        "request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        let started = Instant::now();
        let response = next.run(request).await;
        info!(
            status = response.status().as_u16(),
            elapsed_ms = millis(started.elapsed()),
            "Request handled"
        );
        response
    }
    .instrument(span)
    .await
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
