use axum::{
    http::StatusCode,
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::{
    handlers::{find, health},
    middleware::{error, logging},
    state::AppState,
};

pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.server.request_timeout();

    Router::new()
        .route("/health", get(health::check))
        .route("/find", get(find::find))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(error::error_handling_middleware))
                .layer(middleware::from_fn(logging::logging_middleware))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::GATEWAY_TIMEOUT,
                    request_timeout,
                )),
        )
        .with_state(state)
}
