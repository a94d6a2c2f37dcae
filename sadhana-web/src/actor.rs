//! Actor resolution and extractors
//!
//! Credential verification happens upstream; by the time a request
//! reaches this pipeline an external collaborator has resolved the
//! actor's identity and role. `resolve_actor` carries that contract:
//! it reads the `x-user-id` / `x-user-role` headers the collaborator
//! (or a test) sets and attaches a `CurrentUser` to the request
//! extensions. Anonymous requests pass through without one.

use crate::guards::GuardRejection;
use axum::{
    extract::{FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use sadhana_access::Role;
use tracing::warn;

/// The authenticated actor for one request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// User ID
    pub id: String,
    /// Resolved role
    pub role: Role,
    /// Display name
    pub display_name: Option<String>,
}

impl CurrentUser {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            display_name: None,
        }
    }

    /// Extract an actor from the upstream identity headers
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let id = headers.get("x-user-id")?.to_str().ok()?.to_string();

        let role = match headers.get("x-user-role").and_then(|v| v.to_str().ok()) {
            Some(raw) => match raw.parse::<Role>() {
                Ok(role) => role,
                Err(_) => {
                    // A malformed role fails closed rather than open.
                    warn!(user_id = %id, role = raw, "unrecognized role header");
                    return None;
                }
            },
            None => Role::User,
        };

        Some(Self {
            id,
            role,
            display_name: headers
                .get("x-user-name")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
        })
    }
}

/// Middleware that attaches the resolved actor to the request extensions
pub async fn resolve_actor(mut request: Request, next: Next) -> Response {
    if let Some(user) = CurrentUser::from_headers(request.headers()) {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Extractor for the resolved actor; rejects unauthenticated requests
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(GuardRejection::Unauthenticated)
    }
}

/// Optional actor extractor - never fails
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}

/// Extractor requiring an admin or super-admin actor
pub struct AdminUser(pub CurrentUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if matches!(user.role, Role::Admin | Role::SuperAdmin) {
            Ok(AdminUser(user))
        } else {
            warn!(user_id = %user.id, role = %user.role, "admin access required");
            Err(GuardRejection::forbidden("Admin access required"))
        }
    }
}

/// Extractor requiring the super-admin role
pub struct SuperAdminUser(pub CurrentUser);

impl<S> FromRequestParts<S> for SuperAdminUser
where
    S: Send + Sync,
{
    type Rejection = GuardRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if user.role == Role::SuperAdmin {
            Ok(SuperAdminUser(user))
        } else {
            warn!(user_id = %user.id, role = %user.role, "super admin access required");
            Err(GuardRejection::forbidden("Super admin access required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        headers
    }

    #[test]
    fn test_actor_from_headers() {
        let user = CurrentUser::from_headers(&headers(&[
            ("x-user-id", "asha"),
            ("x-user-role", "MENTOR"),
            ("x-user-name", "Asha"),
        ]))
        .unwrap();
        assert_eq!(user.id, "asha");
        assert_eq!(user.role, Role::Mentor);
        assert_eq!(user.display_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn test_role_defaults_to_user() {
        let user = CurrentUser::from_headers(&headers(&[("x-user-id", "asha")])).unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn test_malformed_role_fails_closed() {
        let resolved = CurrentUser::from_headers(&headers(&[
            ("x-user-id", "asha"),
            ("x-user-role", "OVERLORD"),
        ]));
        assert!(resolved.is_none());
    }

    #[test]
    fn test_anonymous_request_has_no_actor() {
        assert!(CurrentUser::from_headers(&HeaderMap::new()).is_none());
    }
}
