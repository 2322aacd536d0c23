use std::sync::Arc;

use crate::{auth::verify_admin_or_cron, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use bookloop_core::{
    automation::{AutomationLog, AutomationLogStatus},
    followups::FollowUpReport,
};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LogsQuery {
    status: Option<AutomationLogStatus>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetryRequest {
    log_id: i64,
}

/// Manual or cron-driven follow-up poll.
async fn run_follow_ups(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<Json<FollowUpReport>> {
    verify_admin_or_cron(&state, &headers)?;
    let report = state.follow_up_service.run_due_follow_ups().await?;
    Ok(Json(report))
}

async fn list_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<Vec<AutomationLog>>> {
    let logs = state
        .automation_service
        .list_logs(query.status, query.limit)?;
    Ok(Json(logs))
}

async fn get_log(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AutomationLog>> {
    let log = state.automation_service.get_log(id)?;
    Ok(Json(log))
}

async fn list_order_logs(
    Path(order_id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<AutomationLog>>> {
    let logs = state.automation_service.list_logs_for_order(order_id)?;
    Ok(Json(logs))
}

async fn retry_log(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RetryRequest>,
) -> ApiResult<Json<AutomationLog>> {
    let log = state.automation_service.retry(request.log_id).await?;
    Ok(Json(log))
}

/// Routes open to the cron trigger; authorization happens in the handler.
pub fn trigger_router() -> Router<Arc<AppState>> {
    Router::new().route("/automation/follow-ups/run", post(run_follow_ups))
}

/// Log inspection (global and per order) and retry; mounted behind the admin layer.
pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/automation/logs", get(list_logs))
        .route("/automation/logs/retry", post(retry_log))
        .route("/automation/logs/{id}", get(get_log))
        .route("/orders/{id}/logs", get(list_order_logs))
}
