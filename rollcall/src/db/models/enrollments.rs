//! Database response models for enrollments.

use crate::types::{ClassId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Class summary for enrollment listings (classes a student belongs to).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrolledClassDBResponse {
    pub id: ClassId,
    pub name: String,
    pub code: String,
}

/// Student summary for enrollment listings (students enrolled in a class).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EnrolledStudentDBResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}
