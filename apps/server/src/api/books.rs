use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use bookloop_core::books::Book;

async fn list_available_books(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Book>>> {
    let books = state.book_repository.list_available_books()?;
    Ok(Json(books))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/books/available", get(list_available_books))
}
