//! API request/response models for attendance.

use crate::api::models::enrollments::StudentSummary;
use crate::db::models::attendance::{AttendanceDayDBResponse, AttendanceHistoryDBResponse, AttendanceStatsDBResponse};
use crate::types::{AttendanceId, ClassId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Attendance status of a student in a class on a given day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

/// One mark in a batch attendance request. The timestamp's time-of-day is
/// discarded; only the calendar day is stored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordInput {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
}

/// Body of a batch attendance request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    #[schema(value_type = String, format = "uuid")]
    pub class_id: ClassId,
    pub records: Vec<AttendanceRecordInput>,
}

/// Query for the class roster endpoint. Date defaults to today.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct RosterQuery {
    #[param(value_type = String, format = "uuid")]
    pub class_id: ClassId,
    pub date: Option<NaiveDate>,
}

/// Attendance recorded for one student on the queried day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DayAttendance {
    #[schema(value_type = String, format = "uuid")]
    pub student_id: UserId,
    pub status: AttendanceStatus,
}

/// Roster of a class plus the attendance recorded for the queried day.
/// Students missing from `attendance` have no stored record for that day;
/// presenting them as PRESENT is a client-side convention.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RosterResponse {
    pub students: Vec<StudentSummary>,
    pub attendance: Vec<DayAttendance>,
}

/// Aggregate attendance counts over a student's full history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceStats {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}

/// One entry in a student's attendance history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceHistoryEntry {
    #[schema(value_type = String, format = "uuid")]
    pub id: AttendanceId,
    #[schema(value_type = String, format = "uuid")]
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub class_name: String,
    pub class_code: String,
}

/// A student's own attendance view: unbounded stats plus recent history.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentAttendanceResponse {
    pub stats: AttendanceStats,
    pub history: Vec<AttendanceHistoryEntry>,
}

impl From<AttendanceDayDBResponse> for DayAttendance {
    fn from(db: AttendanceDayDBResponse) -> Self {
        Self {
            student_id: db.student_id,
            status: db.status,
        }
    }
}

impl From<AttendanceStatsDBResponse> for AttendanceStats {
    fn from(db: AttendanceStatsDBResponse) -> Self {
        Self {
            total: db.total,
            present: db.present,
            absent: db.absent,
            late: db.late,
        }
    }
}

impl From<AttendanceHistoryDBResponse> for AttendanceHistoryEntry {
    fn from(db: AttendanceHistoryDBResponse) -> Self {
        Self {
            id: db.id,
            class_id: db.class_id,
            date: db.date,
            status: db.status,
            class_name: db.class_name,
            class_code: db.class_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_format() {
        assert_eq!(serde_json::to_string(&AttendanceStatus::Present).unwrap(), "\"PRESENT\"");
        let status: AttendanceStatus = serde_json::from_str("\"EXCUSED\"").unwrap();
        assert_eq!(status, AttendanceStatus::Excused);
        assert!(serde_json::from_str::<AttendanceStatus>("\"SICK\"").is_err());
    }
}
