//! Database request/response models for attendance records.

use crate::api::models::attendance::AttendanceStatus;
use crate::types::{AttendanceId, ClassId, UserId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One attendance mark to upsert: the status of a student in a class on a day.
#[derive(Debug, Clone)]
pub struct AttendanceMarkDBRequest {
    pub student_id: UserId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Attendance recorded for a class on a single day, keyed by student.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceDayDBResponse {
    pub student_id: UserId,
    pub status: AttendanceStatus,
}

/// A student's attendance record joined with the class it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceHistoryDBResponse {
    pub id: AttendanceId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub class_name: String,
    pub class_code: String,
}

/// Aggregate counts over a student's full attendance history.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceStatsDBResponse {
    pub total: i64,
    pub present: i64,
    pub absent: i64,
    pub late: i64,
}
