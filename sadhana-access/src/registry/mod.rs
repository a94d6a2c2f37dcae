//! Permission Registry
//!
//! Static, immutable definition of roles, permissions, role-permission
//! sets, the role hierarchy, per-role metadata and per-resource-type
//! policies, plus pure lookup helpers. Contains no decision logic.
//!
//! The registry is constructed once at process start and injected into the
//! engine; nothing here is a process-global. No lookup ever fails: an
//! unknown role or resource type degrades to the most restrictive answer
//! (empty set, `false`, `None`).

pub mod permission;
pub mod policy;
pub mod role;

pub use permission::Permission;
pub use policy::ResourcePolicy;
pub use role::Role;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Per-role metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDescriptor {
    /// Human-readable name
    pub display_name: String,
    /// Numeric hierarchy level; always equals the role's rank
    pub level: usize,
    /// Roles this role is permitted to grant to others
    pub assignable: Vec<Role>,
}

/// Immutable access-control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRegistry {
    role_permissions: HashMap<Role, HashSet<Permission>>,
    descriptors: HashMap<Role, RoleDescriptor>,
    resource_policies: HashMap<String, ResourcePolicy>,
}

impl AccessRegistry {
    /// Create an empty registry. Intended for tests that assemble
    /// alternate catalogs; production code uses [`AccessRegistry::builtin`].
    pub fn new() -> Self {
        Self {
            role_permissions: HashMap::new(),
            descriptors: HashMap::new(),
            resource_policies: HashMap::new(),
        }
    }

    /// The canonical catalog.
    pub fn builtin() -> Self {
        use Permission::*;

        let mut registry = Self::new();

        // Super admin holds the union of everything that exists; it is
        // derived from the catalog, never hand-curated.
        registry.set_permissions(Role::SuperAdmin, Permission::ALL.iter().copied());

        registry.set_permissions(
            Role::Admin,
            [
                UserCreate,
                UserRead,
                UserUpdate,
                UserDelete,
                UserList,
                ProfileRead,
                ProfileUpdate,
                SadhanaRead,
                SadhanaUpdate,
                SadhanaDelete,
                SadhanaList,
                BookCreate,
                BookRead,
                BookUpdate,
                BookDelete,
                BookList,
                CommunityPostRead,
                CommunityPostDeleteAny,
                CommunityModerate,
                AnalyticsViewAll,
                AdminManageUsers,
                AdminManageContent,
                AdminViewAnalytics,
                AdminViewLogs,
                AdminSettings,
                SystemAccess,
            ],
        );

        registry.set_permissions(
            Role::Mentor,
            [
                ProfileRead,
                ProfileReadOwn,
                ProfileUpdateOwn,
                SadhanaCreate,
                SadhanaRead,
                SadhanaReadOwn,
                SadhanaUpdateOwn,
                SadhanaDeleteOwn,
                SadhanaList,
                BookCreate,
                BookRead,
                BookUpdate,
                BookList,
                CommunityPostCreate,
                CommunityPostRead,
                CommunityPostUpdateOwn,
                CommunityPostDeleteOwn,
                CommunityComment,
                CommunityLike,
                AnalyticsViewOwn,
                SystemAccess,
            ],
        );

        registry.set_permissions(
            Role::User,
            [
                ProfileReadOwn,
                ProfileUpdateOwn,
                SadhanaCreate,
                SadhanaReadOwn,
                SadhanaUpdateOwn,
                SadhanaDeleteOwn,
                BookRead,
                BookList,
                CommunityPostCreate,
                CommunityPostRead,
                CommunityPostUpdateOwn,
                CommunityPostDeleteOwn,
                CommunityComment,
                CommunityLike,
                AnalyticsViewOwn,
                SystemAccess,
            ],
        );

        registry.set_permissions(Role::Guest, [BookRead, BookList, CommunityPostRead]);

        registry.set_permissions(Role::Disabled, []);

        registry.set_descriptor(
            Role::SuperAdmin,
            "Super Administrator",
            &[],
        );
        registry.set_descriptor(
            Role::Admin,
            "Administrator",
            &[Role::Mentor, Role::User, Role::Guest, Role::Disabled],
        );
        registry.set_descriptor(Role::Mentor, "Mentor", &[Role::User, Role::Guest]);
        registry.set_descriptor(Role::User, "User", &[]);
        registry.set_descriptor(Role::Guest, "Guest", &[]);
        registry.set_descriptor(Role::Disabled, "Disabled", &[]);

        registry.set_resource_policy(
            "sadhana",
            ResourcePolicy::new()
                .owner(&["read", "update", "delete", "share", "comment"])
                .mentor(&["read", "comment", "guide"])
                .public(&["read"]),
        );
        registry.set_resource_policy(
            "user_profile",
            ResourcePolicy::new()
                .owner(&["read", "update", "delete_account"])
                .mentor(&["read", "comment"])
                .admin(&["read", "update", "suspend", "delete"])
                .public(&["read_limited"]),
        );
        registry.set_resource_policy(
            "community_post",
            ResourcePolicy::new()
                .owner(&["read", "update", "delete", "edit"])
                .mentor(&["read", "reply", "pin"])
                .admin(&["read", "delete", "hide", "moderate"])
                .public(&["read"]),
        );

        registry
    }

    /// Replace a role's permission set
    pub fn set_permissions<I: IntoIterator<Item = Permission>>(
        &mut self,
        role: Role,
        permissions: I,
    ) {
        self.role_permissions
            .insert(role, permissions.into_iter().collect());
    }

    /// Replace a role's descriptor; the level is always the role's rank
    pub fn set_descriptor(&mut self, role: Role, display_name: &str, assignable: &[Role]) {
        self.descriptors.insert(
            role,
            RoleDescriptor {
                display_name: display_name.to_string(),
                level: role.rank(),
                assignable: assignable.to_vec(),
            },
        );
    }

    /// Replace a resource type's policy
    pub fn set_resource_policy(&mut self, resource_type: &str, policy: ResourcePolicy) {
        self.resource_policies
            .insert(resource_type.to_string(), policy);
    }

    /// The role's permission set; empty for roles the registry does not know
    pub fn permissions_for(&self, role: Role) -> HashSet<Permission> {
        self.role_permissions.get(&role).cloned().unwrap_or_default()
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.role_permissions
            .get(&role)
            .is_some_and(|set| set.contains(&permission))
    }

    /// True if the role's set intersects the given permissions.
    /// Vacuously false for an empty list.
    pub fn has_any(&self, role: Role, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(role, *p))
    }

    /// True only if every given permission is in the role's set.
    /// Vacuously true for an empty list.
    pub fn has_all(&self, role: Role, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(role, *p))
    }

    /// The role's position in the hierarchy
    pub fn rank_of(&self, role: Role) -> usize {
        role.rank()
    }

    /// Strictly higher privilege
    pub fn is_higher_rank(&self, a: Role, b: Role) -> bool {
        a.rank() > b.rank()
    }

    /// Roles this role may grant to others; empty if the role has no descriptor
    pub fn assignable_roles_for(&self, role: Role) -> Vec<Role> {
        self.descriptors
            .get(&role)
            .map(|d| d.assignable.clone())
            .unwrap_or_default()
    }

    /// Descriptor-driven assignment check
    pub fn can_assign(&self, assigner: Role, target: Role) -> bool {
        self.descriptors
            .get(&assigner)
            .is_some_and(|d| d.assignable.contains(&target))
    }

    pub fn descriptor(&self, role: Role) -> Option<&RoleDescriptor> {
        self.descriptors.get(&role)
    }

    /// Human-readable role name; falls back to the wire form
    pub fn display_name(&self, role: Role) -> String {
        self.descriptors
            .get(&role)
            .map(|d| d.display_name.clone())
            .unwrap_or_else(|| role.to_string())
    }

    pub fn resource_policy(&self, resource_type: &str) -> Option<&ResourcePolicy> {
        self.resource_policies.get(resource_type)
    }

    /// All roles with a permission set, in hierarchy order
    pub fn roles(&self) -> Vec<Role> {
        Role::HIERARCHY
            .iter()
            .copied()
            .filter(|r| self.role_permissions.contains_key(r))
            .collect()
    }
}

impl Default for AccessRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_is_union_of_catalog() {
        let registry = AccessRegistry::builtin();
        let super_admin = registry.permissions_for(Role::SuperAdmin);
        assert_eq!(super_admin.len(), Permission::ALL.len());

        // The union of every permission referenced anywhere equals it too.
        let mut referenced: HashSet<Permission> = HashSet::new();
        for role in registry.roles() {
            referenced.extend(registry.permissions_for(role));
        }
        assert_eq!(referenced, super_admin);
    }

    #[test]
    fn test_every_role_is_subset_of_super_admin() {
        let registry = AccessRegistry::builtin();
        let super_admin = registry.permissions_for(Role::SuperAdmin);
        for role in registry.roles() {
            assert!(
                registry.permissions_for(role).is_subset(&super_admin),
                "{role} exceeds the super-admin set"
            );
        }
    }

    #[test]
    fn test_disabled_has_no_permissions() {
        let registry = AccessRegistry::builtin();
        assert!(registry.permissions_for(Role::Disabled).is_empty());
    }

    #[test]
    fn test_empty_list_boundaries() {
        let registry = AccessRegistry::builtin();
        for role in Role::HIERARCHY {
            assert!(registry.has_all(role, &[]));
            assert!(!registry.has_any(role, &[]));
        }
    }

    #[test]
    fn test_rank_order_is_strict_and_total() {
        let registry = AccessRegistry::builtin();
        for a in Role::HIERARCHY {
            assert!(!registry.is_higher_rank(a, a));
            for b in Role::HIERARCHY {
                if a != b {
                    assert_ne!(
                        registry.is_higher_rank(a, b),
                        registry.is_higher_rank(b, a)
                    );
                }
            }
        }
    }

    #[test]
    fn test_descriptor_levels_match_rank() {
        let registry = AccessRegistry::builtin();
        for role in Role::HIERARCHY {
            let descriptor = registry.descriptor(role).unwrap();
            assert_eq!(descriptor.level, role.rank());
        }
    }

    #[test]
    fn test_assignable_roles_are_strictly_lower() {
        let registry = AccessRegistry::builtin();
        for role in Role::HIERARCHY {
            for assignable in registry.assignable_roles_for(role) {
                assert_ne!(assignable, role);
                assert!(registry.is_higher_rank(role, assignable));
            }
        }
    }

    #[test]
    fn test_can_assign_follows_descriptors() {
        let registry = AccessRegistry::builtin();
        assert!(registry.can_assign(Role::Admin, Role::Mentor));
        assert!(registry.can_assign(Role::Mentor, Role::Guest));
        assert!(!registry.can_assign(Role::Mentor, Role::Admin));
        assert!(!registry.can_assign(Role::User, Role::Guest));
    }

    #[test]
    fn test_display_names() {
        let registry = AccessRegistry::builtin();
        assert_eq!(registry.display_name(Role::SuperAdmin), "Super Administrator");
        assert_eq!(registry.display_name(Role::Mentor), "Mentor");
    }

    #[test]
    fn test_unknown_resource_type_is_absent() {
        let registry = AccessRegistry::builtin();
        assert!(registry.resource_policy("astral_plane").is_none());
        assert!(registry.resource_policy("sadhana").is_some());
    }

    #[test]
    fn test_serde_round_trip_preserves_lookups() {
        let registry = AccessRegistry::builtin();
        let json = serde_json::to_string(&registry).unwrap();
        let reloaded: AccessRegistry = serde_json::from_str(&json).unwrap();

        for role in Role::HIERARCHY {
            assert_eq!(
                registry.permissions_for(role),
                reloaded.permissions_for(role)
            );
            assert_eq!(registry.rank_of(role), reloaded.rank_of(role));
            assert_eq!(
                registry.assignable_roles_for(role),
                reloaded.assignable_roles_for(role)
            );
        }
        for resource in ["sadhana", "user_profile", "community_post"] {
            assert!(reloaded.resource_policy(resource).is_some());
        }
    }

    #[test]
    fn test_empty_registry_fails_closed() {
        let registry = AccessRegistry::new();
        assert!(registry.permissions_for(Role::SuperAdmin).is_empty());
        assert!(!registry.has_permission(Role::Admin, Permission::UserRead));
        assert!(registry.assignable_roles_for(Role::Admin).is_empty());
        assert!(registry.resource_policy("sadhana").is_none());
    }
}
