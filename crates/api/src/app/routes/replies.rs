use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use rsvp_core::{SubmitRsvp, REQUIRED_FIELDS_MESSAGE};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/submit", post(submit_reply))
        .route("/replies", get(list_replies))
}

pub async fn submit_reply(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<SubmitRsvp>, JsonRejection>,
) -> axum::response::Response {
    // A body that isn't a JSON object of the expected shape carries no usable fields.
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::debug!(reason = %rejection.body_text(), "unparsable submission body");
            return errors::json_error(StatusCode::BAD_REQUEST, REQUIRED_FIELDS_MESSAGE);
        }
    };

    match services.submissions.submit(body).await {
        // Notifications keep running after the response is sent.
        Ok(_submitted) => (StatusCode::OK, Json(dto::MessageResponse::saved())).into_response(),
        Err(e) => errors::submit_error_to_response(e),
    }
}

pub async fn list_replies(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.queries.list().await {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(e) => errors::query_error_to_response(e),
    }
}
