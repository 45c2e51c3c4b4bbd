//! Backend test support utilities
//!
//! Shared helpers for the tournament backend's unit and integration tests:
//! idempotent logging initialization, RFC 7807 problem-details assertions
//! and unique test data generation.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
