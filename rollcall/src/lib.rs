//! # rollcall: attendance management for schools
//!
//! `rollcall` is a role-based attendance management service. It exposes a
//! RESTful API over a PostgreSQL database of users, classes, enrollments, and
//! attendance records, with three roles gating every operation:
//!
//! - **Administrators** manage user accounts and roles and curate the class
//!   roster.
//! - **Teachers** create classes and mark daily attendance for enrolled
//!   students.
//! - **Students** view their own attendance history and aggregate statistics.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL for all persistence. A request passes
//! through authentication (a JWT session cookie or bearer token, verified by
//! the `CurrentUser` extractor), then a per-operation role guard, and finally
//! a handler that talks to the database through repository interfaces.
//!
//! The **API layer** ([`api`]) defines the HTTP contract: handlers and
//! request/response models. The **authentication layer** ([`auth`]) covers
//! password hashing, session tokens, and role guards. The **database layer**
//! ([`db`]) uses the repository pattern: each table has a repository that owns
//! its queries, and multi-row writes (enrollment resync, batch attendance
//! marking) run inside a single transaction so partial failure rolls back
//! cleanly.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use rollcall::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = rollcall::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     rollcall::telemetry::init_tracing();
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! Migrations run automatically on startup, and an initial ADMIN user is
//! bootstrapped from `admin_email`/`admin_password` (registration can never
//! yield an admin account).

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::users::Role,
    auth::password,
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
};
use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{get, patch, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AttendanceId, ClassId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the rollcall database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: if a user with the configured email already exists, nothing is
/// written and its id is returned. Called during startup so a fresh database
/// always has an administrator (self-registration never grants ADMIN).
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: &str, db: &PgPool) -> anyhow::Result<UserId> {
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    if let Some(existing_user) = user_repo.get_user_by_email(email).await? {
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    let password_hash = password::hash_string(password)?;
    let created_user = user_repo
        .create(&UserCreateDBRequest {
            name: Some("Administrator".to_string()),
            email: email.to_string(),
            role: Role::Admin,
            password_hash,
        })
        .await?;

    tx.commit().await?;
    info!("Created initial admin user {}", email);
    Ok(created_user.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.security.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.security.cors.allow_credentials);

    if let Some(max_age) = config.auth.security.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Authentication routes
    let auth_routes = Router::new()
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", post(api::handlers::auth::logout));

    // Domain routes, paths matching the public API surface
    let api_routes = Router::new()
        .route(
            "/admin/users",
            get(api::handlers::users::list_users)
                .patch(api::handlers::users::change_role)
                .delete(api::handlers::users::delete_user),
        )
        .route("/user/profile", patch(api::handlers::users::update_profile))
        .route(
            "/classes",
            get(api::handlers::classes::list_classes)
                .post(api::handlers::classes::create_class)
                .delete(api::handlers::classes::delete_class),
        )
        .route(
            "/classes/students",
            get(api::handlers::enrollments::get_enrollments)
                .post(api::handlers::enrollments::resync_enrollments)
                .delete(api::handlers::enrollments::remove_enrollment),
        )
        .route("/student/attendance", get(api::handlers::attendance::student_attendance))
        .route("/teacher/attendance", post(api::handlers::attendance::mark_attendance))
        .route("/teacher/students", get(api::handlers::attendance::class_roster));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(auth_routes)
        .merge(api_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations,
///    and bootstraps the initial admin user
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
///    until the shutdown future resolves
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application over an existing pool (used by tests)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let pool = match pool {
            Some(pool) => pool,
            None => {
                let settings = &config.database.pool;
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .min_connections(settings.min_connections)
                    .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
                    .connect(&config.database.url)
                    .await?
            }
        };

        migrator().run(&pool).await?;

        // Bootstrap the initial admin, if credentials were configured
        match config.admin_password.as_deref() {
            Some(admin_password) => {
                create_initial_admin_user(&config.admin_email, admin_password, &pool).await?;
            }
            None => {
                warn!("admin_password not configured; skipping initial admin bootstrap");
            }
        }

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let Application { router, config, pool } = self;

        let bind_addr = config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Rollcall listening on http://{bind_addr}");

        // Run the server with graceful shutdown
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Close database connections
        info!("Closing database connections...");
        pool.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, create_test_config};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_openapi_json_served(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert!(body["paths"]["/classes"].is_object());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_initial_admin_bootstrap_is_idempotent(pool: PgPool) {
        let config = create_test_config();

        let first = create_initial_admin_user(&config.admin_email, "admin-password", &pool).await.unwrap();
        let second = create_initial_admin_user(&config.admin_email, "different-password", &pool).await.unwrap();
        assert_eq!(first, second);

        let mut conn = pool.acquire().await.unwrap();
        let mut users = crate::db::handlers::Users::new(&mut conn);
        let admin = users.get_user_by_email(&config.admin_email).await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
    }
}
