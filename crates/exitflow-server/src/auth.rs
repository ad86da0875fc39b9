//! Caller identity from gateway-forwarded headers
//!
//! Token verification happens upstream; the gateway forwards the verified
//! identity as headers and this extractor turns them into an `AuthContext`.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::ApiError;
use exitflow_core::Actor;
use exitflow_types::{ActorRole, EmployeeId, UserId};

const USER_ID_HEADER: &str = "x-auth-user-id";
const ROLE_HEADER: &str = "x-auth-role";
const EMAIL_HEADER: &str = "x-auth-email";
const EMPLOYEE_ID_HEADER: &str = "x-auth-employee-id";

/// Verified caller identity for one request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: ActorRole,
    pub email: String,
    pub employee_id: Option<EmployeeId>,
}

impl AuthContext {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id.clone(),
            role: self.role,
            email: self.email.clone(),
            employee_id: self.employee_id.clone(),
        }
    }

    /// Gate a handler to a fixed set of roles.
    pub fn require_role(&self, allowed: &[ActorRole]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "Role {} is not allowed to perform this action",
                self.role
            )))
        }
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing authenticated user id"))?;

        let role = header(parts, ROLE_HEADER)
            .ok_or_else(|| ApiError::unauthorized("Missing authenticated role"))?
            .parse::<ActorRole>()
            .map_err(|e| ApiError::unauthorized(format!("Invalid role header: {}", e)))?;

        let email = header(parts, EMAIL_HEADER)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing authenticated email"))?;

        let employee_id = header(parts, EMPLOYEE_ID_HEADER)
            .filter(|s| !s.is_empty())
            .map(EmployeeId::new);

        Ok(Self {
            user_id: UserId::new(user_id),
            role,
            email: email.to_string(),
            employee_id,
        })
    }
}
