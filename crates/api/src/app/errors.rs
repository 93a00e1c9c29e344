use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use rsvp_infra::{QueryError, StoreError, SubmitError};

pub const READ_FAILED: &str = "Failed to read data.";
pub const SAVE_FAILED: &str = "Failed to save reply.";

pub fn submit_error_to_response(err: SubmitError) -> axum::response::Response {
    match err {
        SubmitError::Rejected(e) => json_error(StatusCode::BAD_REQUEST, e.to_string()),
        SubmitError::Store(e) => store_error_to_response(&e),
    }
}

pub fn query_error_to_response(err: QueryError) -> axum::response::Response {
    match err {
        QueryError::Read(e) => store_error_to_response(&e),
    }
}

fn store_error_to_response(err: &StoreError) -> axum::response::Response {
    tracing::error!(error = %err, "response store failure");
    let message = match err {
        StoreError::Read(_) | StoreError::Corrupt(_) => READ_FAILED,
        StoreError::Write(_) => SAVE_FAILED,
    };
    json_error(StatusCode::INTERNAL_SERVER_ERROR, message)
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}
