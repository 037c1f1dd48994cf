use axum::{
    extract::{Query, State},
    response::Json as JsonResponse,
};
use serde::{Deserialize, Serialize};

use crate::api::server::http::{error::HttpError, state::AppState};
use crate::core::Node;
use crate::services::{FindReport, SearchStats};

#[derive(Debug, Deserialize)]
pub struct FindRequest {
    pub source: Option<String>,
    pub target: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FindResponse {
    pub source: Node,
    pub target: Node,
    pub found: bool,
    pub path: Option<Vec<Node>>,
    pub stats: SearchStats,
}

impl From<FindReport> for FindResponse {
    fn from(report: FindReport) -> Self {
        Self {
            found: report.found(),
            source: report.source,
            target: report.target,
            path: report.path,
            stats: report.stats,
        }
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, HttpError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(HttpError::BadRequest(format!("缺少参数: {}", name))),
    }
}

pub async fn find(
    State(state): State<AppState>,
    Query(request): Query<FindRequest>,
) -> Result<JsonResponse<FindResponse>, HttpError> {
    let source = required(request.source, "source")?;
    let target = required(request.target, "target")?;

    let report = state.server.finder().find(&source, &target).await?;
    Ok(JsonResponse(report.into()))
}
