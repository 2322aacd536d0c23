use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    auth::{login, require_admin},
    config::Config,
    main_lib::AppState,
};

pub mod automation;
pub mod books;
pub mod messages;
pub mod orders;

async fn healthz() -> &'static str {
    "ok"
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<HeaderValue>>();
        CorsLayer::new().allow_origin(origins)
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let admin = automation::admin_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_admin,
    ));

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/auth/login", post(login))
        .merge(orders::router())
        .merge(books::router())
        .merge(messages::router())
        .merge(automation::trigger_router())
        .merge(admin)
        .with_state(state);

    Router::new()
        .nest("/api/v1", api)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
