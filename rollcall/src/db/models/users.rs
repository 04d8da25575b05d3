//! Database request/response models for users.

use crate::api::models::users::Role;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to create a user row.
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// Request to update a user row. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
}

/// A user row as returned by the repository.
///
/// Carries the password hash for credential verification; API models never
/// expose it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub password_hash: String,
}
