//! Authorization Engine
//!
//! Turns registry facts into access decisions for a specific actor and,
//! where relevant, a specific resource. Every operation is a
//! deterministic, side-effect-free function of its inputs and the
//! immutable registry, safe to call concurrently from any number of
//! workers.

use crate::error::{AccessError, AccessResult};
use crate::filter::{DataFilter, Visibility};
use crate::registry::{AccessRegistry, Permission, Role};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// Privacy classes for viewing another user's data
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserDataScope {
    Public,
    Basic,
    Profile,
}

impl FromStr for UserDataScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(UserDataScope::Public),
            "basic" => Ok(UserDataScope::Basic),
            "profile" => Ok(UserDataScope::Profile),
            _ => Err(format!("Unknown data scope: {}", s)),
        }
    }
}

/// Fields stripped from a user's own record before returning it
const OWN_RECORD_DENY_LIST: [&str; 2] = ["ip_history", "suspicious_activity"];

/// Fields anyone else may see of a user record
const PUBLIC_RECORD_FIELDS: [&str; 6] =
    ["id", "display_name", "avatar", "role", "created_at", "bio"];

/// Actions probed when listing what an actor may do to a resource
const PROBED_ACTIONS: [&str; 6] = ["read", "create", "update", "delete", "moderate", "publish"];

/// Access-decision functions over an injected [`AccessRegistry`]
#[derive(Debug, Clone)]
pub struct RbacEngine {
    registry: Arc<AccessRegistry>,
}

impl RbacEngine {
    pub fn new(registry: Arc<AccessRegistry>) -> Self {
        Self { registry }
    }

    /// Engine over the canonical builtin catalog
    pub fn builtin() -> Self {
        Self::new(Arc::new(AccessRegistry::builtin()))
    }

    pub fn registry(&self) -> &AccessRegistry {
        &self.registry
    }

    /// Permission check for an actor. A missing role never passes.
    pub fn actor_has_permission(&self, role: Option<Role>, permission: Permission) -> bool {
        match role {
            Some(role) => self.registry.has_permission(role, permission),
            None => false,
        }
    }

    /// True if the actor holds any of the given permissions
    pub fn actor_has_any_permission(&self, role: Option<Role>, permissions: &[Permission]) -> bool {
        match role {
            Some(role) => self.registry.has_any(role, permissions),
            None => false,
        }
    }

    /// True only if the actor holds every given permission
    pub fn actor_has_all_permissions(
        &self,
        role: Option<Role>,
        permissions: &[Permission],
    ) -> bool {
        match role {
            Some(role) => self.registry.has_all(role, permissions),
            None => false,
        }
    }

    /// Resource access decision. First match wins:
    /// admins pass, disabled accounts fail, and anything without full
    /// ownership context is denied rather than guessed at.
    pub fn can_access_resource(
        &self,
        role: Option<Role>,
        resource_type: &str,
        action: &str,
        resource_owner_id: Option<&str>,
        actor_id: Option<&str>,
    ) -> bool {
        let Some(role) = role else {
            return false;
        };

        if self.is_admin(role) {
            return true;
        }

        if role == Role::Disabled {
            return false;
        }

        match (resource_owner_id, actor_id) {
            (Some(owner_id), Some(actor_id)) => {
                self.resolve_policy(resource_type, role, action, owner_id, actor_id)
            }
            _ => {
                debug!(
                    resource_type,
                    action, "resource check without ownership context denied"
                );
                false
            }
        }
    }

    /// Resolve a resource policy in fixed priority order: ownership beats
    /// role buckets, role buckets beat the public set. There is no
    /// most-permissive merge.
    pub fn resolve_policy(
        &self,
        resource_type: &str,
        role: Role,
        action: &str,
        owner_id: &str,
        actor_id: &str,
    ) -> bool {
        let Some(policy) = self.registry.resource_policy(resource_type) else {
            return false;
        };

        if actor_id == owner_id && policy.owner_can.contains(action) {
            return true;
        }

        if policy
            .bucket_for(role)
            .is_some_and(|bucket| bucket.contains(action))
        {
            return true;
        }

        policy.public_can.contains(action)
    }

    /// Whether one user may modify another, by role hierarchy.
    /// Super admins may touch anyone below them; admins and mentors only
    /// strictly lower ranks; everyone else nobody.
    pub fn can_modify_user(&self, modifier_role: Role, target_role: Role) -> bool {
        match modifier_role {
            Role::SuperAdmin => target_role != Role::SuperAdmin,
            Role::Admin | Role::Mentor => self.registry.is_higher_rank(modifier_role, target_role),
            _ => false,
        }
    }

    /// Whether a viewer may see a privacy class of another user's data.
    /// Self-view always wins, then admin, then the per-role allow-lists.
    pub fn can_view_user_data(
        &self,
        viewer_role: Role,
        viewer_id: &str,
        target_id: &str,
        scope: UserDataScope,
    ) -> bool {
        if viewer_id == target_id {
            return true;
        }

        if self.is_admin(viewer_role) {
            return true;
        }

        match viewer_role {
            Role::Mentor => matches!(scope, UserDataScope::Basic | UserDataScope::Profile),
            Role::User => matches!(scope, UserDataScope::Public | UserDataScope::Basic),
            Role::Guest => scope == UserDataScope::Public,
            _ => false,
        }
    }

    /// Validate a role change before any mutation happens. The assignment
    /// itself is the caller's job.
    pub fn validate_role_change(
        &self,
        modifier_role: Role,
        current_target_role: Role,
        new_role: Role,
    ) -> AccessResult<()> {
        if !self.can_modify_user(modifier_role, current_target_role) {
            return Err(AccessError::forbidden("Cannot modify this user"));
        }

        self.validate_role_assignment(modifier_role, new_role)
    }

    /// The rank half of [`validate_role_change`]: no one may grant a rank
    /// above their own, a super admin included.
    ///
    /// [`validate_role_change`]: RbacEngine::validate_role_change
    pub fn validate_role_assignment(&self, modifier_role: Role, new_role: Role) -> AccessResult<()> {
        if self.registry.is_higher_rank(new_role, modifier_role) {
            return Err(AccessError::InvalidRoleAssignment(
                "Cannot assign role higher than your own".to_string(),
            ));
        }
        Ok(())
    }

    /// Descriptor-driven assignment check (parallel to the rank rule)
    pub fn can_assign_role(&self, assigner: Option<Role>, target: Role) -> bool {
        match assigner {
            Some(assigner) => self.registry.can_assign(assigner, target),
            None => false,
        }
    }

    /// Fails with `Forbidden` unless the actor holds the permission
    pub fn validate_permission(
        &self,
        role: Option<Role>,
        permission: Permission,
    ) -> AccessResult<()> {
        if self.actor_has_permission(role, permission) {
            Ok(())
        } else {
            Err(AccessError::forbidden("Insufficient permissions"))
        }
    }

    /// Fails with `Forbidden` unless the role is one of the allowed set
    pub fn validate_role(&self, role: Option<Role>, allowed: &[Role]) -> AccessResult<()> {
        match role {
            Some(role) if allowed.contains(&role) => Ok(()),
            _ => Err(AccessError::forbidden("Invalid role for this operation")),
        }
    }

    /// Strip a user record down to what the viewer may see.
    /// Non-object values are returned untouched; field absence is never
    /// filled in.
    pub fn sanitize_user_data(&self, record: &Value, viewer_role: Role, is_own: bool) -> Value {
        let Some(fields) = record.as_object() else {
            return record.clone();
        };

        if self.is_admin(viewer_role) {
            return record.clone();
        }

        if is_own {
            let mut own: Map<String, Value> = fields.clone();
            for field in OWN_RECORD_DENY_LIST {
                own.remove(field);
            }
            return Value::Object(own);
        }

        let mut public = Map::new();
        for field in PUBLIC_RECORD_FIELDS {
            if let Some(value) = fields.get(field) {
                public.insert(field.to_string(), value.clone());
            }
        }
        Value::Object(public)
    }

    /// Declarative restriction for a downstream data layer.
    /// Roles without an explicit branch match nothing.
    pub fn data_access_filter(&self, role: Option<Role>, actor_id: &str) -> DataFilter {
        match role {
            Some(Role::Admin) | Some(Role::SuperAdmin) => DataFilter::Unrestricted,
            Some(Role::User) => DataFilter::OwnedOrVisible {
                owner_id: actor_id.to_string(),
                visible: vec![Visibility::Public, Visibility::Followers],
            },
            Some(Role::Guest) => DataFilter::Visible {
                visibility: Visibility::Public,
            },
            _ => DataFilter::MatchNothing,
        }
    }

    /// Actions the actor could perform on a resource, probed from a fixed list
    pub fn available_actions(
        &self,
        role: Option<Role>,
        resource_type: &str,
        resource_owner_id: Option<&str>,
        actor_id: Option<&str>,
    ) -> Vec<&'static str> {
        PROBED_ACTIONS
            .iter()
            .copied()
            .filter(|action| {
                self.can_access_resource(role, resource_type, action, resource_owner_id, actor_id)
            })
            .collect()
    }

    pub fn is_admin(&self, role: Role) -> bool {
        matches!(role, Role::Admin | Role::SuperAdmin)
    }

    pub fn is_super_admin(&self, role: Role) -> bool {
        role == Role::SuperAdmin
    }

    pub fn is_disabled(&self, role: Role) -> bool {
        role == Role::Disabled
    }

    pub fn is_guest(&self, role: Role) -> bool {
        role == Role::Guest
    }
}
