use crate::{
    AppState,
    api::models::{
        Confirmation,
        classes::{ClassCreateRequest, ClassDetailResponse, ClassResponse, DeleteClassQuery},
        users::{CurrentUser, Role},
    },
    auth::{require_admin, require_role},
    db::{handlers::Classes, models::classes::ClassCreateDBRequest},
    errors::Error,
    types::{Operation, Resource},
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};

/// List all classes
#[utoipa::path(
    get,
    path = "/classes",
    tag = "classes",
    summary = "List classes",
    description = "List all classes ordered by name, with enrollment counts and teacher summaries",
    responses(
        (status = 200, description = "List of classes", body = [ClassDetailResponse]),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(skip(state, _current_user))]
pub async fn list_classes(State(state): State<AppState>, _current_user: CurrentUser) -> Result<Json<Vec<ClassDetailResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Classes::new(&mut conn);

    let classes = repo.list_with_details().await?;

    Ok(Json(classes.into_iter().map(ClassDetailResponse::from).collect()))
}

/// Create a class
#[utoipa::path(
    post,
    path = "/classes",
    tag = "classes",
    summary = "Create class",
    description = "Create a new class (admin or teacher)",
    request_body = ClassCreateRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Class name and code are required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Class code already exists"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn create_class(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ClassCreateRequest>,
) -> Result<(StatusCode, Json<ClassResponse>), Error> {
    require_role(&current_user, &[Role::Admin, Role::Teacher], Resource::Classes, Operation::CreateAll)?;

    let name = request.name.trim();
    let code = request.code.trim();
    if name.is_empty() || code.is_empty() {
        return Err(Error::BadRequest {
            message: "Class name and code are required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Classes::new(&mut conn);

    // A duplicate code surfaces as a unique violation and maps to 409
    let class = repo
        .create(&ClassCreateDBRequest {
            name: name.to_string(),
            code: code.to_string(),
            teacher_id: request.teacher_id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ClassResponse::from(class))))
}

/// Delete a class
#[utoipa::path(
    delete,
    path = "/classes",
    tag = "classes",
    summary = "Delete class",
    description = "Delete a class and its enrollments and attendance (admin only)",
    params(DeleteClassQuery),
    responses(
        (status = 200, description = "Class deleted", body = Confirmation),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 404, description = "Class not found"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn delete_class(
    State(state): State<AppState>,
    Query(query): Query<DeleteClassQuery>,
    current_user: CurrentUser,
) -> Result<Json<Confirmation>, Error> {
    require_admin(&current_user, Resource::Classes, Operation::DeleteAll)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Classes::new(&mut conn);

    match repo.delete(query.class_id).await? {
        true => Ok(Json(Confirmation::new("Class deleted"))),
        false => Err(Error::NotFound {
            resource: "Class".to_string(),
            id: query.class_id.to_string(),
        }),
    }
}
