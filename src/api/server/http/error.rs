use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::core::SearchError;

#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
    GatewayTimeout(String),
    InternalError(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            HttpError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            HttpError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            HttpError::BadRequest(msg)
            | HttpError::NotFound(msg)
            | HttpError::BadGateway(msg)
            | HttpError::GatewayTimeout(msg)
            | HttpError::InternalError(msg) => msg,
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<SearchError> for HttpError {
    fn from(err: SearchError) -> Self {
        let message = err.to_string();
        match err {
            SearchError::NotFound(_) => HttpError::NotFound(message),
            SearchError::RemoteQuery { .. } => HttpError::BadGateway(message),
            SearchError::Timeout(_) => HttpError::GatewayTimeout(message),
            SearchError::Cancelled | SearchError::Config(_) | SearchError::Internal(_) => {
                HttpError::InternalError(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_search_error_status_mapping() {
        let cases = [
            (SearchError::NotFound("X".to_string()), StatusCode::NOT_FOUND),
            (SearchError::remote("X", "HTTP 500"), StatusCode::BAD_GATEWAY),
            (
                SearchError::Timeout(Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                SearchError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status(), status);
        }
    }
}
