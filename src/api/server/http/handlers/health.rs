use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde_json::json;

use crate::api::server::http::state::AppState;

pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let options = state.server.finder().options();
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "wikiracer",
            "version": env!("CARGO_PKG_VERSION"),
            "mode": options.mode.to_string(),
        })),
    )
}
