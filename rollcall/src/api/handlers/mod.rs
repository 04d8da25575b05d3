//! HTTP request handlers, one module per resource.

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod enrollments;
pub mod users;
