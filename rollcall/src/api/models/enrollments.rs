//! API request/response models for enrollments.

use crate::api::models::classes::ClassSummary;
use crate::db::models::enrollments::EnrolledStudentDBResponse;
use crate::types::{ClassId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query for the enrollment listing endpoint: exactly one of the two
/// parameters selects the direction of the lookup.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentQuery {
    /// List the students enrolled in this class
    #[param(value_type = Option<String>, format = "uuid")]
    pub class_id: Option<ClassId>,
    /// List the classes this student is enrolled in
    #[param(value_type = Option<String>, format = "uuid")]
    pub student_id: Option<UserId>,
}

/// Body of an enrollment resync: the full replacement set of class ids.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResyncRequest {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[schema(value_type = Vec<String>, format = "uuid")]
    pub class_ids: Vec<ClassId>,
}

/// Query parameters for removing a single enrollment
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RemoveEnrollmentQuery {
    #[param(value_type = String, format = "uuid")]
    pub student_id: UserId,
    #[param(value_type = String, format = "uuid")]
    pub class_id: ClassId,
}

/// Student summary (id/name/email) used in rosters.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentSummary {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub name: Option<String>,
    pub email: String,
}

/// Response of the enrollment listing endpoint: students of a class, or
/// classes of a student, depending on the query.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum EnrollmentListResponse {
    Students { students: Vec<StudentSummary> },
    Classes { classes: Vec<ClassSummary> },
}

impl From<EnrolledStudentDBResponse> for StudentSummary {
    fn from(db: EnrolledStudentDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
        }
    }
}
