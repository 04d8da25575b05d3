//! Database repository for attendance records.

use crate::db::{
    errors::Result,
    models::attendance::{AttendanceDayDBResponse, AttendanceHistoryDBResponse, AttendanceMarkDBRequest, AttendanceStatsDBResponse},
};
use crate::types::{ClassId, UserId, abbrev_uuid};
use chrono::NaiveDate;
use sqlx::{Connection, PgConnection};
use tracing::instrument;
use uuid::Uuid;

pub struct Attendance<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Attendance<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Record a whole batch of marks in one transaction. Each mark upserts on
    /// the (student, class, date) key, so re-marking a day replaces the status
    /// instead of duplicating the row, and a failure partway through commits
    /// nothing.
    #[instrument(skip(self, records), fields(class_id = %abbrev_uuid(&class_id), count = records.len()), err)]
    pub async fn mark_many(&mut self, class_id: ClassId, records: &[AttendanceMarkDBRequest]) -> Result<()> {
        let mut tx = self.db.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO attendance (id, student_id, class_id, date, status)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (student_id, class_id, date)
                DO UPDATE SET status = EXCLUDED.status
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(record.student_id)
            .bind(class_id)
            .bind(record.date)
            .bind(record.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Attendance recorded for a class on a single day. Students without a
    /// row simply don't appear; the PRESENT default is a caller convention.
    #[instrument(skip(self), fields(class_id = %abbrev_uuid(&class_id), %date), err)]
    pub async fn for_class_on(&mut self, class_id: ClassId, date: NaiveDate) -> Result<Vec<AttendanceDayDBResponse>> {
        let records = sqlx::query_as::<_, AttendanceDayDBResponse>(
            "SELECT student_id, status FROM attendance WHERE class_id = $1 AND date = $2",
        )
        .bind(class_id)
        .bind(date)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }

    /// A student's most recent records (date descending), joined with class
    /// name and code.
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id), limit), err)]
    pub async fn history_for_student(&mut self, student_id: UserId, limit: i64) -> Result<Vec<AttendanceHistoryDBResponse>> {
        let records = sqlx::query_as::<_, AttendanceHistoryDBResponse>(
            r#"
            SELECT a.id, a.class_id, a.date, a.status,
                   c.name AS class_name, c.code AS class_code
            FROM attendance a
            INNER JOIN classes c ON c.id = a.class_id
            WHERE a.student_id = $1
            ORDER BY a.date DESC
            LIMIT $2
            "#,
        )
        .bind(student_id)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(records)
    }

    /// Aggregate counts over the student's full history - deliberately not
    /// windowed to the history limit.
    #[instrument(skip(self), fields(student_id = %abbrev_uuid(&student_id)), err)]
    pub async fn stats_for_student(&mut self, student_id: UserId) -> Result<AttendanceStatsDBResponse> {
        let stats = sqlx::query_as::<_, AttendanceStatsDBResponse>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'PRESENT') AS present,
                   COUNT(*) FILTER (WHERE status = 'ABSENT') AS absent,
                   COUNT(*) FILTER (WHERE status = 'LATE') AS late
            FROM attendance
            WHERE student_id = $1
            "#,
        )
        .bind(student_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stats)
    }
}
