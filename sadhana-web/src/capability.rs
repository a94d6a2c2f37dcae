//! Per-request capability object
//!
//! A convenience view over the engine for downstream handlers: fixed
//! methods pre-bound to the actor's role so handlers can make ad-hoc
//! checks without re-deriving anything. Every answer is delegated to the
//! engine; this type holds no logic of its own.

use crate::actor::CurrentUser;
use crate::state::AppState;
use axum::{extract::{Request, State}, middleware::Next, response::Response};
use sadhana_access::{Permission, RbacEngine, Role};

/// Pre-bound permission checks for the current actor
#[derive(Clone)]
pub struct Capabilities {
    engine: RbacEngine,
    role: Role,
    actor_id: String,
}

impl Capabilities {
    pub fn new(engine: RbacEngine, user: &CurrentUser) -> Self {
        Self {
            engine,
            role: user.role,
            actor_id: user.id.clone(),
        }
    }

    pub fn actor_id(&self) -> &str {
        &self.actor_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn can_create(&self, resource: &str) -> bool {
        self.check(resource, "create")
    }

    pub fn can_read(&self, resource: &str) -> bool {
        self.check(resource, "read")
    }

    pub fn can_update(&self, resource: &str) -> bool {
        self.check(resource, "update")
    }

    pub fn can_delete(&self, resource: &str) -> bool {
        self.check(resource, "delete")
    }

    /// Alias for the read check, kept for handler readability
    pub fn can_access(&self, resource: &str) -> bool {
        self.can_read(resource)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.engine.actor_has_permission(Some(self.role), permission)
    }

    pub fn is_admin(&self) -> bool {
        self.engine.is_admin(self.role)
    }

    pub fn is_super_admin(&self) -> bool {
        self.engine.is_super_admin(self.role)
    }

    /// Resolve `"<resource>:<action>"` against the catalog; identifiers
    /// outside the catalog fail closed.
    fn check(&self, resource: &str, action: &str) -> bool {
        format!("{}:{}", resource, action)
            .parse::<Permission>()
            .map(|permission| self.engine.actor_has_permission(Some(self.role), permission))
            .unwrap_or(false)
    }
}

/// Middleware attaching a capability object for authenticated requests
pub async fn attach_capabilities(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = request.extensions().get::<CurrentUser>().cloned() {
        let capabilities = Capabilities::new(state.engine.clone(), &user);
        request.extensions_mut().insert(capabilities);
    }
    next.run(request).await
}
