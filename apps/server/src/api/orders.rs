use std::sync::Arc;

use crate::{auth::verify_admin, error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use bookloop_core::orders::{ActorRole, NewOrder, Order, OrderFilter, TransitionRequest};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteOrderQuery {
    buyer_id: i64,
}

async fn place_order(
    State(state): State<Arc<AppState>>,
    Json(new_order): Json<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.order_service.place_order(new_order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Vec<Order>>> {
    let orders = state.order_service.list_orders(filter)?;
    Ok(Json(orders))
}

async fn get_order(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Order>> {
    let order = state.order_service.get_order(id)?;
    Ok(Json(order))
}

/// Admin transitions additionally need a valid admin bearer token; buyer and
/// seller ownership is checked by the order service.
async fn transition_order(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<TransitionRequest>,
) -> ApiResult<Json<Order>> {
    if request.actor_role == ActorRole::Admin {
        verify_admin(&state, &headers)?;
    }
    let order = state.order_service.transition(request).await?;
    Ok(Json(order))
}

async fn delete_order(
    Path(id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeleteOrderQuery>,
) -> ApiResult<StatusCode> {
    state.order_service.delete_order(id, query.buyer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list_orders).post(place_order))
        .route("/orders/transition", post(transition_order))
        .route("/orders/{id}", get(get_order).delete(delete_order))
}
