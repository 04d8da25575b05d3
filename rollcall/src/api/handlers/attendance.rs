use crate::{
    AppState,
    api::models::{
        Confirmation,
        attendance::{
            AttendanceHistoryEntry, AttendanceStats, DayAttendance, MarkAttendanceRequest, RosterQuery, RosterResponse,
            StudentAttendanceResponse,
        },
        enrollments::StudentSummary,
        users::{CurrentUser, Role},
    },
    auth::require_role,
    db::{
        handlers::{Attendance, Enrollments},
        models::attendance::AttendanceMarkDBRequest,
    },
    errors::Error,
    types::{Operation, Resource},
};
use axum::{
    Json,
    extract::{Query, State},
};
use chrono::Utc;

/// How many records a student's own history view returns. Stats are always
/// computed over the full history.
const HISTORY_LIMIT: i64 = 30;

/// Mark attendance for a class
#[utoipa::path(
    post,
    path = "/teacher/attendance",
    tag = "attendance",
    summary = "Mark attendance",
    description = "Record a batch of attendance marks for a class; one row per student/day, re-marking replaces the status (teacher or admin)",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Attendance saved", body = Confirmation),
        (status = 400, description = "Unknown student or class id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    )
)]
#[tracing::instrument(skip(state, current_user, request))]
pub async fn mark_attendance(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<MarkAttendanceRequest>,
) -> Result<Json<Confirmation>, Error> {
    require_role(&current_user, &[Role::Teacher, Role::Admin], Resource::Attendance, Operation::UpdateAll)?;

    // Time-of-day is discarded; only the calendar day is stored
    let records: Vec<AttendanceMarkDBRequest> = request
        .records
        .iter()
        .map(|record| AttendanceMarkDBRequest {
            student_id: record.student_id,
            date: record.date.date_naive(),
            status: record.status,
        })
        .collect();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Attendance::new(&mut conn);

    repo.mark_many(request.class_id, &records).await?;

    Ok(Json(Confirmation::new("Attendance saved")))
}

/// Class roster with the attendance recorded for a day
#[utoipa::path(
    get,
    path = "/teacher/students",
    tag = "attendance",
    summary = "Roster with attendance",
    description = "Enrolled students of a class plus the attendance recorded for the given day (defaults to today)",
    params(RosterQuery),
    responses(
        (status = 200, description = "Roster and day attendance", body = RosterResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn class_roster(
    State(state): State<AppState>,
    Query(query): Query<RosterQuery>,
    _current_user: CurrentUser,
) -> Result<Json<RosterResponse>, Error> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    let students = {
        let mut enrollments = Enrollments::new(&mut conn);
        enrollments.students_for_class(query.class_id).await?
    };

    // Students without a row for this day get no synthesized record; the
    // PRESENT default is a presentation convention, never stored.
    let attendance = {
        let mut repo = Attendance::new(&mut conn);
        repo.for_class_on(query.class_id, date).await?
    };

    Ok(Json(RosterResponse {
        students: students.into_iter().map(StudentSummary::from).collect(),
        attendance: attendance.into_iter().map(DayAttendance::from).collect(),
    }))
}

/// The caller's own attendance history and statistics
#[utoipa::path(
    get,
    path = "/student/attendance",
    tag = "attendance",
    summary = "Own attendance",
    description = "The authenticated user's 30 most recent attendance records plus aggregate counts over their full history",
    responses(
        (status = 200, description = "Stats and history", body = StudentAttendanceResponse),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn student_attendance(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> Result<Json<StudentAttendanceResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Attendance::new(&mut conn);

    // Scoped to the principal; the id never comes from a parameter
    let history = repo.history_for_student(current_user.id, HISTORY_LIMIT).await?;
    let stats = repo.stats_for_student(current_user.id).await?;

    Ok(Json(StudentAttendanceResponse {
        stats: AttendanceStats::from(stats),
        history: history.into_iter().map(AttendanceHistoryEntry::from).collect(),
    }))
}
