use serde::Serialize;

pub const SAVED_MESSAGE: &str = "Reply saved successfully!";

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn saved() -> Self {
        Self {
            message: SAVED_MESSAGE,
        }
    }
}
