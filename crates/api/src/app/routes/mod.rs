use axum::Router;

pub mod replies;
pub mod system;

/// Router for the RSVP endpoints.
pub fn router() -> Router {
    replies::router()
}
