//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection or transaction, provides
//! strongly-typed operations for one table, and returns domain models from
//! [`crate::db::models`]. The CRUD-shaped [`Users`] repository implements the
//! [`Repository`] trait; the join-table repositories ([`Enrollments`],
//! [`Attendance`]) expose inherent methods instead.

pub mod attendance;
pub mod classes;
pub mod enrollments;
pub mod repository;
pub mod users;

pub use attendance::Attendance;
pub use classes::Classes;
pub use enrollments::Enrollments;
pub use repository::Repository;
pub use users::Users;
