use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, AuthSuccessResponse, LoginRequest, LoginResponse, LogoutResponse, RegisterBody, RegisterRequest, RegisterResponse},
        users::{CurrentUser, Role, UserSummary},
    },
    auth::{password, session},
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 201, description = "User registered successfully", body = RegisterBody),
        (status = 400, description = "Missing or invalid input"),
        (status = 409, description = "An account with this email already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(State(state): State<AppState>, Json(request): Json<RegisterRequest>) -> Result<RegisterResponse, Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(Error::BadRequest {
            message: "Name, email, and password are required".to_string(),
        });
    }

    // Validate password length
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    // Requested role is honored only for STUDENT and TEACHER; anything else
    // (including ADMIN) falls back to STUDENT.
    let role = match request.role.as_deref() {
        Some("TEACHER") => Role::Teacher,
        _ => Role::Student,
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    // Pre-check for a clean conflict message; the unique constraint on email
    // remains the backstop for races.
    if user_repo.get_user_by_email(&email).await?.is_some() {
        return Err(Error::Conflict {
            message: "An account with this email address already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking the async runtime
    let params = password::Argon2Params::from(password_config);
    let plaintext = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&plaintext, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        name: Some(name),
        email,
        role,
        password_hash,
    };

    let created_user = user_repo.create(&create_request).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    // Log the new session in immediately
    let current_user = CurrentUser::from(created_user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(RegisterResponse {
        body: RegisterBody {
            message: "Account created successfully".to_string(),
            user_id: created_user.id,
        },
        cookie,
    })
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<LoginResponse, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // Find user by email
    let user = user_repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking the async runtime
    let plaintext = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&plaintext, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;
    let cookie = create_session_cookie(&token, &state.config);

    Ok(LoginResponse {
        auth_response: AuthResponse {
            user: UserSummary::from(user),
            message: "Login successful".to_string(),
        },
        cookie,
    })
}

/// Logout (clear session)
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Logout successful", body = AuthSuccessResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn logout(State(state): State<AppState>) -> Result<LogoutResponse, Error> {
    // Create expired cookie to clear the session
    let cookie = format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0",
        state.config.auth.session.cookie_name
    );

    Ok(LogoutResponse {
        auth_response: AuthSuccessResponse {
            message: "Logout successful".to_string(),
        },
        cookie,
    })
}

/// Helper function to create a session cookie
fn create_session_cookie(token: &str, config: &crate::config::Config) -> String {
    let session_config = &config.auth.session;
    let max_age = session_config.timeout.as_secs();

    format!(
        "{}={}; Path=/; HttpOnly; Secure={}; SameSite={}; Max-Age={}",
        session_config.cookie_name, token, session_config.cookie_secure, session_config.cookie_same_site, max_age
    )
}

#[cfg(test)]
mod tests {
    use crate::api::models::auth::AuthResponse;
    use crate::api::models::users::Role;
    use crate::test_utils::{create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_success(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        let response = app
            .post("/auth/register")
            .json(&json!({
                "name": "New Student",
                "email": "new@example.com",
                "password": "password123"
            }))
            .await;

        response.assert_status(axum::http::StatusCode::CREATED);
        assert!(response.headers().get("set-cookie").is_some());

        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Account created successfully");
        assert!(body["userId"].is_string());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_defaults_to_student_role(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;

        for (email, role, expected) in [
            ("a@example.com", json!(null), Role::Student),
            ("b@example.com", json!("TEACHER"), Role::Teacher),
            ("c@example.com", json!("ADMIN"), Role::Student),
            ("d@example.com", json!("INVALID"), Role::Student),
        ] {
            let response = app
                .post("/auth/register")
                .json(&json!({
                    "name": "User",
                    "email": email,
                    "password": "password123",
                    "role": role
                }))
                .await;
            response.assert_status(axum::http::StatusCode::CREATED);

            let mut conn = pool.acquire().await.unwrap();
            let mut users = crate::db::handlers::Users::new(&mut conn);
            let user = users.get_user_by_email(email).await.unwrap().unwrap();
            assert_eq!(user.role, expected, "role for {email}");
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_missing_fields(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/auth/register")
            .json(&json!({
                "name": "",
                "email": "x@example.com",
                "password": "password123"
            }))
            .await;
        response.assert_status_bad_request();

        let response = app
            .post("/auth/register")
            .json(&json!({
                "name": "X",
                "email": "x@example.com",
                "password": ""
            }))
            .await;
        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email_conflicts(pool: PgPool) {
        let app = create_test_app(pool).await;

        let payload = json!({
            "name": "First",
            "email": "same@example.com",
            "password": "password123"
        });

        app.post("/auth/register").json(&payload).await.assert_status(axum::http::StatusCode::CREATED);

        let response = app.post("/auth/register").json(&payload).await;
        response.assert_status(axum::http::StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_roundtrip(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, Role::Student).await;

        let response = app
            .post("/auth/login")
            .json(&json!({
                "email": user.email,
                "password": crate::test_utils::TEST_PASSWORD
            }))
            .await;

        response.assert_status_ok();
        assert!(response.headers().get("set-cookie").is_some());
        let body: AuthResponse = response.json();
        assert_eq!(body.user.id, user.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_bad_credentials(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool, Role::Student).await;

        let response = app
            .post("/auth/login")
            .json(&json!({
                "email": user.email,
                "password": "wrong-password"
            }))
            .await;
        response.assert_status_unauthorized();

        let response = app
            .post("/auth/login")
            .json(&json!({
                "email": "nobody@example.com",
                "password": "irrelevant"
            }))
            .await;
        response.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_clears_cookie(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app.post("/auth/logout").await;
        response.assert_status_ok();

        let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
        assert!(cookie.contains("Max-Age=0"));
    }
}
