//! OpenAPI documentation for the management API, served at `/docs`.

use utoipa::OpenApi;

use crate::api::models::{
    Confirmation,
    attendance::{
        AttendanceHistoryEntry, AttendanceRecordInput, AttendanceStats, AttendanceStatus, DayAttendance, MarkAttendanceRequest,
        RosterResponse, StudentAttendanceResponse,
    },
    auth::{AuthResponse, AuthSuccessResponse, LoginRequest, RegisterBody, RegisterRequest},
    classes::{ClassCreateRequest, ClassDetailResponse, ClassResponse, ClassSummary, TeacherSummary},
    enrollments::{EnrollmentListResponse, EnrollmentResyncRequest, StudentSummary},
    users::{ProfileUpdateRequest, Role, RoleChangeRequest, UserResponse, UserSummary},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rollcall API",
        description = "Role-based attendance management: admins manage accounts and the class roster, teachers mark daily attendance, students read their own history."
    ),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::change_role,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::users::update_profile,
        crate::api::handlers::classes::list_classes,
        crate::api::handlers::classes::create_class,
        crate::api::handlers::classes::delete_class,
        crate::api::handlers::enrollments::get_enrollments,
        crate::api::handlers::enrollments::resync_enrollments,
        crate::api::handlers::enrollments::remove_enrollment,
        crate::api::handlers::attendance::mark_attendance,
        crate::api::handlers::attendance::class_roster,
        crate::api::handlers::attendance::student_attendance,
    ),
    components(schemas(
        Role,
        AttendanceStatus,
        RegisterRequest,
        RegisterBody,
        LoginRequest,
        AuthResponse,
        AuthSuccessResponse,
        UserResponse,
        UserSummary,
        RoleChangeRequest,
        ProfileUpdateRequest,
        ClassCreateRequest,
        ClassResponse,
        ClassDetailResponse,
        ClassSummary,
        TeacherSummary,
        EnrollmentResyncRequest,
        EnrollmentListResponse,
        StudentSummary,
        MarkAttendanceRequest,
        AttendanceRecordInput,
        RosterResponse,
        DayAttendance,
        StudentAttendanceResponse,
        AttendanceStats,
        AttendanceHistoryEntry,
        Confirmation,
    )),
    tags(
        (name = "auth", description = "Registration and session management"),
        (name = "users", description = "User accounts, roles, and profiles"),
        (name = "classes", description = "Class roster management"),
        (name = "enrollments", description = "Student/class enrollment"),
        (name = "attendance", description = "Daily attendance records"),
    )
)]
pub struct ApiDoc;
