use crate::{
    AppState,
    api::models::{
        Confirmation,
        classes::ClassSummary,
        enrollments::{EnrollmentListResponse, EnrollmentQuery, EnrollmentResyncRequest, RemoveEnrollmentQuery, StudentSummary},
        users::{CurrentUser, Role},
    },
    auth::require_role,
    db::handlers::Enrollments,
    errors::Error,
    types::{Operation, Resource},
};
use axum::{
    Json,
    extract::{Query, State},
};

/// List enrollments for a class, or for a student
#[utoipa::path(
    get,
    path = "/classes/students",
    tag = "enrollments",
    summary = "Get enrollments",
    description = "List the students of a class (classId) or the classes of a student (studentId)",
    params(EnrollmentQuery),
    responses(
        (status = 200, description = "Students or classes", body = EnrollmentListResponse),
        (status = 400, description = "classId or studentId required"),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn get_enrollments(
    State(state): State<AppState>,
    Query(query): Query<EnrollmentQuery>,
    _current_user: CurrentUser,
) -> Result<Json<EnrollmentListResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    if let Some(class_id) = query.class_id {
        let students = repo.students_for_class(class_id).await?;
        return Ok(Json(EnrollmentListResponse::Students {
            students: students.into_iter().map(StudentSummary::from).collect(),
        }));
    }

    if let Some(student_id) = query.student_id {
        let classes = repo.classes_for_student(student_id).await?;
        return Ok(Json(EnrollmentListResponse::Classes {
            classes: classes.into_iter().map(ClassSummary::from).collect(),
        }));
    }

    Err(Error::BadRequest {
        message: "classId or studentId required".to_string(),
    })
}

/// Replace a student's enrollment set
#[utoipa::path(
    post,
    path = "/classes/students",
    tag = "enrollments",
    summary = "Resync enrollments",
    description = "Replace a student's entire enrollment set with the given class ids (admin or teacher)",
    request_body = EnrollmentResyncRequest,
    responses(
        (status = 200, description = "Enrollments updated", body = Confirmation),
        (status = 400, description = "Unknown student or class id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn resync_enrollments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<EnrollmentResyncRequest>,
) -> Result<Json<Confirmation>, Error> {
    require_role(&current_user, &[Role::Admin, Role::Teacher], Resource::Enrollments, Operation::UpdateAll)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    // Replace semantics: clears everything, then inserts the new set in one
    // transaction. An unknown id trips a foreign key and rolls the lot back.
    repo.resync_for_student(request.student_id, &request.class_ids).await?;

    Ok(Json(Confirmation::new("Enrollments updated")))
}

/// Remove a single enrollment
#[utoipa::path(
    delete,
    path = "/classes/students",
    tag = "enrollments",
    summary = "Remove enrollment",
    description = "Remove a single student/class enrollment; removing an absent one is not an error (admin or teacher)",
    params(RemoveEnrollmentQuery),
    responses(
        (status = 200, description = "Enrollment removed", body = Confirmation),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn remove_enrollment(
    State(state): State<AppState>,
    Query(query): Query<RemoveEnrollmentQuery>,
    current_user: CurrentUser,
) -> Result<Json<Confirmation>, Error> {
    require_role(&current_user, &[Role::Admin, Role::Teacher], Resource::Enrollments, Operation::DeleteAll)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Enrollments::new(&mut conn);

    // Idempotent delete
    repo.remove(query.student_id, query.class_id).await?;

    Ok(Json(Confirmation::new("Enrollment removed")))
}
