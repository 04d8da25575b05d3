//! API request/response models for classes.

use crate::db::models::classes::{ClassDBResponse, ClassDetailDBResponse, ClassTeacherDBResponse};
use crate::types::{ClassId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of a class-creation request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassCreateRequest {
    pub name: String,
    pub code: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub teacher_id: Option<UserId>,
}

/// A class as returned on creation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ClassId,
    pub name: String,
    pub code: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub teacher_id: Option<UserId>,
}

/// Teacher summary attached to a class listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherSummary {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

/// A class listing entry: the class plus its enrollment count and teacher.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetailResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: ClassId,
    pub name: String,
    pub code: String,
    #[schema(value_type = Option<String>, format = "uuid")]
    pub teacher_id: Option<UserId>,
    pub enrolled_count: i64,
    pub teacher: Option<TeacherSummary>,
}

/// Short class summary (id/name/code) used in enrollment and attendance views.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassSummary {
    #[schema(value_type = String, format = "uuid")]
    pub id: ClassId,
    pub name: String,
    pub code: String,
}

/// Query parameters for deleting a class
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DeleteClassQuery {
    #[param(value_type = String, format = "uuid")]
    pub class_id: ClassId,
}

impl From<ClassDBResponse> for ClassResponse {
    fn from(db: ClassDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            code: db.code,
            teacher_id: db.teacher_id,
        }
    }
}

impl From<ClassTeacherDBResponse> for TeacherSummary {
    fn from(db: ClassTeacherDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
        }
    }
}

impl From<ClassDetailDBResponse> for ClassDetailResponse {
    fn from(db: ClassDetailDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            code: db.code,
            teacher_id: db.teacher_id,
            enrolled_count: db.enrolled_count,
            teacher: db.teacher.map(TeacherSummary::from),
        }
    }
}

impl From<crate::db::models::enrollments::EnrolledClassDBResponse> for ClassSummary {
    fn from(db: crate::db::models::enrollments::EnrolledClassDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            code: db.code,
        }
    }
}
