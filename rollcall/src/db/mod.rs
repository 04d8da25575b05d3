//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL,
//! following the repository pattern: API handlers call repositories
//! ([`handlers`]), repositories run queries and return records ([`models`]),
//! and failures are classified into [`errors::DbError`].

pub mod errors;
pub mod handlers;
pub mod models;
