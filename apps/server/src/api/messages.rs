use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use bookloop_core::messages::Message;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InboxQuery {
    user_id: i64,
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InboxQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    let messages = state
        .message_repository
        .list_messages_for_user(query.user_id)?;
    Ok(Json(messages))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/messages", get(list_messages))
}
