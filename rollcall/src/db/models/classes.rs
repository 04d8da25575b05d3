//! Database request/response models for classes.

use crate::types::{ClassId, UserId};
use serde::{Deserialize, Serialize};

/// Request to create a class row. Name and code arrive pre-trimmed.
#[derive(Debug, Clone)]
pub struct ClassCreateDBRequest {
    pub name: String,
    pub code: String,
    pub teacher_id: Option<UserId>,
}

/// A class row as returned by the repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDBResponse {
    pub id: ClassId,
    pub name: String,
    pub code: String,
    pub teacher_id: Option<UserId>,
}

/// Teacher summary joined onto a class listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassTeacherDBResponse {
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

/// A class annotated with its enrollment count and assigned teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDetailDBResponse {
    pub id: ClassId,
    pub name: String,
    pub code: String,
    pub teacher_id: Option<UserId>,
    pub enrolled_count: i64,
    pub teacher: Option<ClassTeacherDBResponse>,
}
