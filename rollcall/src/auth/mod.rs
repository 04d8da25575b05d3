//! Authentication and authorization.
//!
//! Authentication is session-based: a JWT is issued at login/registration and
//! carried in an HttpOnly cookie (or an `Authorization: Bearer` header). The
//! [`CurrentUser`](crate::api::models::users::CurrentUser) extractor verifies
//! the token; the guard helpers below enforce role policy per operation.

pub mod current_user;
pub mod password;
pub mod session;

use crate::{
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
    types::{Operation, Resource},
};

/// Require the principal to be an ADMIN.
pub fn require_admin(user: &CurrentUser, resource: Resource, action: Operation) -> Result<()> {
    require_role(user, &[Role::Admin], resource, action)
}

/// Require the principal's role to be in `allowed`.
pub fn require_role(user: &CurrentUser, allowed: &[Role], resource: Resource, action: Operation) -> Result<()> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(Error::forbidden(resource, action))
    }
}
