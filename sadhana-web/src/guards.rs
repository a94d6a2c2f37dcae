//! Pipeline guards
//!
//! Each guard adapts one engine decision into a middleware stage. Guards
//! hold no state across requests; every invocation is fully determined by
//! the request's context plus the registry behind the engine.

use crate::actor::CurrentUser;
use crate::state::AppState;
use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use sadhana_access::{AccessError, Permission, Role};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

/// Largest request body a guard will buffer while resolving payload fields
const MAX_GUARDED_BODY_BYTES: usize = 1024 * 1024;

/// Structured rejection raised by any guard in the pipeline
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GuardRejection {
    /// No actor attached to the request
    #[error("Authentication required")]
    Unauthenticated,
    /// Actor present but the check failed; carries the unmet requirement
    #[error("{message}")]
    Forbidden {
        message: String,
        requirement: Option<Value>,
    },
    /// Attempted role grant exceeds the assigner's own rank
    #[error("{0}")]
    InvalidRoleAssignment(String),
}

impl GuardRejection {
    pub fn forbidden(message: impl Into<String>) -> Self {
        GuardRejection::Forbidden {
            message: message.into(),
            requirement: None,
        }
    }

    pub fn forbidden_with(message: impl Into<String>, requirement: Value) -> Self {
        GuardRejection::Forbidden {
            message: message.into(),
            requirement: Some(requirement),
        }
    }
}

impl From<AccessError> for GuardRejection {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => GuardRejection::Unauthenticated,
            AccessError::Forbidden(message) => GuardRejection::forbidden(message),
            AccessError::InvalidRoleAssignment(message) => {
                GuardRejection::InvalidRoleAssignment(message)
            }
        }
    }
}

impl IntoResponse for GuardRejection {
    fn into_response(self) -> Response {
        match self {
            GuardRejection::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Unauthorized",
                    "message": "Authentication required",
                })),
            )
                .into_response(),
            GuardRejection::Forbidden {
                message,
                requirement,
            } => {
                let mut body = json!({
                    "error": "Forbidden",
                    "message": message,
                });
                if let Some(requirement) = requirement {
                    body["requirement"] = requirement;
                }
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            GuardRejection::InvalidRoleAssignment(message) => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "InvalidRoleAssignment",
                    "message": message,
                })),
            )
                .into_response(),
        }
    }
}

/// What a guard demands of the actor
#[derive(Debug, Clone)]
pub enum Requirement {
    /// Actor's role must be one of these
    Roles(Vec<Role>),
    /// Actor must hold every listed permission
    AllPermissions(Vec<Permission>),
    /// Actor must hold at least one listed permission
    AnyPermission(Vec<Permission>),
}

impl Requirement {
    pub fn roles(roles: &[Role]) -> Self {
        Requirement::Roles(roles.to_vec())
    }

    pub fn all_permissions(permissions: &[Permission]) -> Self {
        Requirement::AllPermissions(permissions.to_vec())
    }

    pub fn any_permission(permissions: &[Permission]) -> Self {
        Requirement::AnyPermission(permissions.to_vec())
    }

    /// Evaluate the requirement against the actor's role
    pub fn satisfied_by(&self, state: &AppState, role: Role) -> bool {
        match self {
            Requirement::Roles(roles) => roles.contains(&role),
            Requirement::AllPermissions(permissions) => state
                .engine
                .actor_has_all_permissions(Some(role), permissions),
            Requirement::AnyPermission(permissions) => {
                state.engine.actor_has_any_permission(Some(role), permissions)
            }
        }
    }

    /// Diagnostic payload describing the unmet requirement
    pub fn describe(&self) -> Value {
        match self {
            Requirement::Roles(roles) => json!({ "required_roles": roles }),
            Requirement::AllPermissions(permissions) => {
                json!({ "required_permissions": permissions })
            }
            Requirement::AnyPermission(permissions) => {
                json!({ "required_permissions": permissions, "mode": "any" })
            }
        }
    }

    fn denial_message(&self) -> &'static str {
        match self {
            Requirement::Roles(_) => "Insufficient role permissions",
            Requirement::AllPermissions(_) | Requirement::AnyPermission(_) => {
                "Insufficient permissions"
            }
        }
    }
}

/// Guard produced by the requirement factory: attach with
/// `middleware::from_fn_with_state((state, requirement), access_guard)`.
pub async fn access_guard(
    State((state, requirement)): State<(AppState, Requirement)>,
    request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let Some(user) = request.extensions().get::<CurrentUser>() else {
        return Err(GuardRejection::Unauthenticated);
    };

    if !requirement.satisfied_by(&state, user.role) {
        debug!(user_id = %user.id, role = %user.role, "request blocked by access guard");
        return Err(GuardRejection::forbidden_with(
            requirement.denial_message(),
            requirement.describe(),
        ));
    }

    Ok(next.run(request).await)
}

/// Rejects disabled accounts before any permission guard can run.
/// Anonymous requests pass through untouched.
pub async fn disabled_guard(request: Request, next: Next) -> Result<Response, GuardRejection> {
    if let Some(user) = request.extensions().get::<CurrentUser>() {
        if user.role == Role::Disabled {
            debug!(user_id = %user.id, "disabled account rejected");
            return Err(GuardRejection::forbidden("Your account has been disabled"));
        }
    }
    Ok(next.run(request).await)
}

/// Where the claimed resource-owner id lives in the request
#[derive(Debug, Clone, Copy)]
pub enum OwnerRef {
    /// A path parameter, e.g. `{user_id}`
    PathParam(&'static str),
    /// A top-level field of a JSON request body
    BodyField(&'static str),
}

impl OwnerRef {
    /// Resolve the claimed owner id, handing back the (possibly rebuilt)
    /// request. A missing or unreadable claim resolves to `None`.
    async fn resolve(self, request: Request) -> (Request, Option<String>) {
        match self {
            OwnerRef::PathParam(name) => {
                let (mut parts, body) = request.into_parts();
                let owner = Path::<HashMap<String, String>>::from_request_parts(&mut parts, &())
                    .await
                    .ok()
                    .and_then(|Path(params)| params.get(name).cloned());
                (Request::from_parts(parts, body), owner)
            }
            OwnerRef::BodyField(name) => {
                let (parts, body) = request.into_parts();
                let Ok(bytes) = to_bytes(body, MAX_GUARDED_BODY_BYTES).await else {
                    return (Request::from_parts(parts, Body::empty()), None);
                };
                let owner = serde_json::from_slice::<Value>(&bytes)
                    .ok()
                    .and_then(|payload| payload.get(name)?.as_str().map(|s| s.to_string()));
                (Request::from_parts(parts, Body::from(bytes)), owner)
            }
        }
    }
}

/// Resource-ownership guard: admins pass, everyone else must be the
/// claimed owner. Attach with
/// `middleware::from_fn_with_state((state, owner_ref), ownership_guard)`.
pub async fn ownership_guard(
    State((state, owner_ref)): State<(AppState, OwnerRef)>,
    request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let Some(user) = request.extensions().get::<CurrentUser>().cloned() else {
        return Err(GuardRejection::Unauthenticated);
    };

    if state.engine.is_admin(user.role) {
        return Ok(next.run(request).await);
    }

    let (request, owner_id) = owner_ref.resolve(request).await;

    match owner_id {
        Some(owner_id) if owner_id == user.id => Ok(next.run(request).await),
        _ => {
            debug!(user_id = %user.id, "ownership check failed");
            Err(GuardRejection::forbidden("You do not own this resource"))
        }
    }
}

/// Role-assignment guard: when the payload names a role to grant, enforce
/// the rank rule before the handler runs. Payloads without a `role` field
/// pass through; the handler's own validation decides what that means.
pub async fn role_assignment_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, GuardRejection> {
    let Some(user) = request.extensions().get::<CurrentUser>().cloned() else {
        return Err(GuardRejection::Unauthenticated);
    };

    let (parts, body) = request.into_parts();
    let Ok(bytes) = to_bytes(body, MAX_GUARDED_BODY_BYTES).await else {
        return Err(GuardRejection::forbidden("Unreadable request body"));
    };

    let named_role = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .and_then(|payload| payload.get("role")?.as_str().map(|s| s.to_string()));

    if let Some(raw) = named_role {
        let new_role: Role = raw
            .parse()
            .map_err(|_| GuardRejection::forbidden(format!("Unknown role: {}", raw)))?;
        state
            .engine
            .validate_role_assignment(user.role, new_role)
            .map_err(GuardRejection::from)?;
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requirement_roles() {
        let state = AppState::new(crate::WebConfig::default()).unwrap();
        let requirement = Requirement::roles(&[Role::Admin, Role::SuperAdmin]);
        assert!(requirement.satisfied_by(&state, Role::Admin));
        assert!(!requirement.satisfied_by(&state, Role::Mentor));
    }

    #[test]
    fn test_requirement_permissions() {
        let state = AppState::new(crate::WebConfig::default()).unwrap();

        let all = Requirement::all_permissions(&[Permission::BookRead, Permission::BookList]);
        assert!(all.satisfied_by(&state, Role::Guest));
        assert!(!all.satisfied_by(&state, Role::Disabled));

        let any = Requirement::any_permission(&[Permission::UserDelete, Permission::BookRead]);
        assert!(any.satisfied_by(&state, Role::Guest));
        assert!(!any.satisfied_by(&state, Role::Disabled));
    }

    #[test]
    fn test_rejection_shapes() {
        let rejection = GuardRejection::forbidden_with(
            "Insufficient permissions",
            json!({ "required_permissions": ["user:list"] }),
        );
        match rejection {
            GuardRejection::Forbidden { requirement, .. } => {
                assert!(requirement.is_some());
            }
            _ => panic!("expected forbidden"),
        }
    }

    #[test]
    fn test_access_error_mapping() {
        assert_eq!(
            GuardRejection::from(AccessError::Unauthenticated),
            GuardRejection::Unauthenticated
        );
        assert_eq!(
            GuardRejection::from(AccessError::InvalidRoleAssignment("too high".into())),
            GuardRejection::InvalidRoleAssignment("too high".into())
        );
    }
}
