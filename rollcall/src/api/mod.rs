//! HTTP API layer: request handlers and their data models.

pub mod handlers;
pub mod models;
