//! Infrastructure layer: response storage, email notification, and the
//! submission/query orchestration that composes them.

pub mod config;
pub mod notifier;
pub mod query;
pub mod response_store;
pub mod submission;

pub use query::{QueryError, QueryService, ReplyListing};
pub use response_store::{InMemoryResponseStore, JsonFileResponseStore, ResponseStore, StoreError};
pub use submission::{SubmitError, SubmissionService};
