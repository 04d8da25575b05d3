//! API request and response data models.
//!
//! Data structures for HTTP request deserialization and response
//! serialization; these define the public API contract. They are distinct
//! from the database models in [`crate::db::models`] so the API and storage
//! representations can evolve independently. All models are annotated with
//! `utoipa` for the generated API docs.

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod enrollments;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic confirmation body for delete/resync style operations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
