//! `rsvp-core` — RSVP domain building blocks.
//!
//! This crate contains **pure domain** types and functions (no infrastructure concerns):
//! the guest response record, its validation gate, and attendance aggregation.

pub mod attendance;
pub mod error;
pub mod record;

pub use attendance::{Attendance, AttendanceTotals};
pub use error::{DomainError, DomainResult};
pub use record::{Flag, FormValue, RsvpRecord, SubmitRsvp, REQUIRED_FIELDS_MESSAGE};
