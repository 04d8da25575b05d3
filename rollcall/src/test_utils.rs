//! Test utilities: configuration, server, and data fixtures.

use crate::AppState;
use crate::api::models::users::{CurrentUser, Role};
use crate::auth::{password, session};
use crate::config::Config;
use crate::db::handlers::{Classes, Repository, Users};
use crate::db::models::classes::{ClassCreateDBRequest, ClassDBResponse};
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use sqlx::PgPool;
use uuid::Uuid;

/// Password every test fixture user is created with
pub const TEST_PASSWORD: &str = "password123";

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    };

    // Cheap hashing parameters so fixture creation stays fast
    config.auth.password.argon2_memory_kib = 8;
    config.auth.password.argon2_iterations = 1;
    config.auth.password.argon2_parallelism = 1;

    config
}

pub fn create_test_app_state(pool: PgPool, config: Config) -> AppState {
    AppState::builder().db(pool).config(config).build()
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

/// Build a DB-layer create request with a verifiable test password.
pub fn user_create_request(email: &str, role: Role) -> UserCreateDBRequest {
    let params = password::Argon2Params {
        memory_kib: 8,
        iterations: 1,
        parallelism: 1,
    };
    let password_hash = password::hash_string_with_params(TEST_PASSWORD, Some(params)).expect("Failed to hash test password");

    UserCreateDBRequest {
        name: Some("Test User".to_string()),
        email: email.to_string(),
        role,
        password_hash,
    }
}

pub async fn create_test_user(pool: &PgPool, role: Role) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);

    let email = format!("testuser_{}@example.com", Uuid::new_v4().simple());
    users_repo
        .create(&user_create_request(&email, role))
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_admin_user(pool: &PgPool) -> UserDBResponse {
    create_test_user(pool, Role::Admin).await
}

pub async fn create_test_class(pool: &PgPool, name: &str, code: &str) -> ClassDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut classes_repo = Classes::new(&mut conn);

    classes_repo
        .create(&ClassCreateDBRequest {
            name: name.to_string(),
            code: code.to_string(),
            teacher_id: None,
        })
        .await
        .expect("Failed to create test class")
}

pub async fn create_test_class_with_teacher(pool: &PgPool, name: &str, code: &str, teacher_id: UserId) -> ClassDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut classes_repo = Classes::new(&mut conn);

    classes_repo
        .create(&ClassCreateDBRequest {
            name: name.to_string(),
            code: code.to_string(),
            teacher_id: Some(teacher_id),
        })
        .await
        .expect("Failed to create test class")
}

/// Cookie header authenticating a request as the given user.
pub fn session_cookie(user: &UserDBResponse) -> (HeaderName, HeaderValue) {
    let config = create_test_config();
    let current_user = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    };
    let token = session::create_session_token(&current_user, &config).expect("Failed to create session token");

    (
        HeaderName::from_static("cookie"),
        HeaderValue::from_str(&format!("{}={}", config.auth.session.cookie_name, token)).expect("Failed to build cookie header"),
    )
}
