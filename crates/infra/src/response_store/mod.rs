//! Append-only response store boundary.
//!
//! This module defines the only path through which the reply collection is read
//! or mutated, plus a file-backed and an in-memory implementation.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryResponseStore;
pub use json_file::JsonFileResponseStore;
pub use r#trait::{decode_document, encode_document, ResponseCollection, ResponseStore, StoreError};
