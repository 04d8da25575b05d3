//! Database-facing request and response models.
//!
//! These are distinct from the API models in [`crate::api::models`]: the DB
//! models mirror table rows (and may carry fields like password hashes that
//! the API never exposes), while API models define the HTTP contract.

pub mod attendance;
pub mod classes;
pub mod enrollments;
pub mod users;
