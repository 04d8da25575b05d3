use crate::{
    AppState,
    api::models::{
        Confirmation,
        classes::ClassSummary,
        users::{CurrentUser, DeleteUserQuery, ListUsersQuery, ProfileUpdateRequest, Role, RoleChangeRequest, UserResponse, UserSummary},
    },
    auth::require_admin,
    db::{
        handlers::{Enrollments, Repository, Users, users::UserFilter},
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
    types::{Operation, Resource},
};
use axum::{
    Json,
    extract::{Query, State},
};

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/admin/users",
    tag = "users",
    summary = "List users",
    description = "List all users with their enrollments, newest first (admin only)",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "List of users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 500, description = "Internal server error"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
    current_user: CurrentUser,
) -> Result<Json<Vec<UserResponse>>, Error> {
    require_admin(&current_user, Resource::Users, Operation::ReadAll)?;

    let skip = query.skip.unwrap_or(0);
    let limit = query.limit.unwrap_or(100).min(1000);

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let users;
    {
        let mut repo = Users::new(&mut tx);
        users = repo.list(&UserFilter::new(skip, limit)).await?;
    }

    // Fetch each user's enrolled classes in bulk to avoid an N+1
    let user_ids: Vec<_> = users.iter().map(|u| u.id).collect();
    let mut enrollments_by_user = {
        let mut enrollments_repo = Enrollments::new(&mut tx);
        enrollments_repo.classes_for_students_bulk(&user_ids).await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    let response_users = users
        .into_iter()
        .map(|user| {
            let enrollments = enrollments_by_user
                .remove(&user.id)
                .unwrap_or_default()
                .into_iter()
                .map(ClassSummary::from)
                .collect();
            UserResponse::from(user).with_enrollments(enrollments)
        })
        .collect();

    Ok(Json(response_users))
}

/// Change a user's role (admin only)
#[utoipa::path(
    patch,
    path = "/admin/users",
    tag = "users",
    summary = "Change role",
    description = "Change a user's role (admin only)",
    request_body = RoleChangeRequest,
    responses(
        (status = 200, description = "Role updated", body = UserSummary),
        (status = 400, description = "Invalid role, or changing your own role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn change_role(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<RoleChangeRequest>,
) -> Result<Json<UserSummary>, Error> {
    require_admin(&current_user, Resource::Users, Operation::UpdateAll)?;

    let role = Role::parse(&request.role).ok_or_else(|| Error::BadRequest {
        message: "Invalid role".to_string(),
    })?;

    // Demoting yourself would cut off the only path back
    if request.user_id == current_user.id {
        return Err(Error::BadRequest {
            message: "You cannot change your own role".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let updated = repo
        .update(
            request.user_id,
            &UserUpdateDBRequest {
                name: None,
                role: Some(role),
            },
        )
        .await?;

    Ok(Json(UserSummary::from(updated)))
}

/// Delete a user (admin only)
#[utoipa::path(
    delete,
    path = "/admin/users",
    tag = "users",
    summary = "Delete user",
    description = "Delete a user and their enrollments and attendance (admin only)",
    params(DeleteUserQuery),
    responses(
        (status = 200, description = "User deleted", body = Confirmation),
        (status = 400, description = "Cannot delete your own account"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - admin access required"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn delete_user(
    State(state): State<AppState>,
    Query(query): Query<DeleteUserQuery>,
    current_user: CurrentUser,
) -> Result<Json<Confirmation>, Error> {
    require_admin(&current_user, Resource::Users, Operation::DeleteAll)?;

    // Prevent self-deletion
    if query.user_id == current_user.id {
        return Err(Error::BadRequest {
            message: "Cannot delete your own account".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    match repo.delete(query.user_id).await? {
        true => Ok(Json(Confirmation::new("User deleted"))),
        false => Err(Error::NotFound {
            resource: "User".to_string(),
            id: query.user_id.to_string(),
        }),
    }
}

/// Update the caller's own display name
#[utoipa::path(
    patch,
    path = "/user/profile",
    tag = "users",
    summary = "Update profile",
    description = "Update the authenticated user's display name",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserSummary),
        (status = 400, description = "Name is required"),
        (status = 401, description = "Unauthorized"),
    )
)]
#[tracing::instrument(skip(state, current_user))]
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ProfileUpdateRequest>,
) -> Result<Json<UserSummary>, Error> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(Error::BadRequest {
            message: "Name is required".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut conn);

    let updated = repo
        .update(
            current_user.id,
            &UserUpdateDBRequest {
                name: Some(name.to_string()),
                role: None,
            },
        )
        .await?;

    Ok(Json(UserSummary::from(updated)))
}
