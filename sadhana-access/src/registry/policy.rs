//! Resource policies
//!
//! Per-resource-type tables of action names permitted to the owner, to
//! specific role classes, and to the public. Action names are local to the
//! resource type and independent of the global permission catalog.

use super::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Action sets for one resource type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourcePolicy {
    /// Actions the resource owner may perform
    pub owner_can: HashSet<String>,
    /// Actions mentors may perform on resources they do not own
    pub mentor_can: HashSet<String>,
    /// Actions admins may perform; not every resource type grants any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_can: Option<HashSet<String>>,
    /// Actions anyone may perform
    pub public_can: HashSet<String>,
}

impl ResourcePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner(mut self, actions: &[&str]) -> Self {
        self.owner_can = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn mentor(mut self, actions: &[&str]) -> Self {
        self.mentor_can = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn admin(mut self, actions: &[&str]) -> Self {
        self.admin_can = Some(actions.iter().map(|a| a.to_string()).collect());
        self
    }

    pub fn public(mut self, actions: &[&str]) -> Self {
        self.public_can = actions.iter().map(|a| a.to_string()).collect();
        self
    }

    /// The role-class bucket for a role, if the policy model defines one.
    ///
    /// Only mentor and admin carry role buckets; every other role
    /// contributes nothing here and falls through to the public set.
    pub fn bucket_for(&self, role: Role) -> Option<&HashSet<String>> {
        match role {
            Role::Mentor => Some(&self.mentor_can),
            Role::Admin => self.admin_can.as_ref(),
            Role::SuperAdmin | Role::User | Role::Guest | Role::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResourcePolicy {
        ResourcePolicy::new()
            .owner(&["read", "update", "delete"])
            .mentor(&["read", "comment"])
            .admin(&["read", "suspend"])
            .public(&["read"])
    }

    #[test]
    fn test_bucket_for_mentor_and_admin() {
        let policy = sample();
        assert!(policy.bucket_for(Role::Mentor).unwrap().contains("comment"));
        assert!(policy.bucket_for(Role::Admin).unwrap().contains("suspend"));
    }

    #[test]
    fn test_roles_without_buckets() {
        let policy = sample();
        assert!(policy.bucket_for(Role::User).is_none());
        assert!(policy.bucket_for(Role::Guest).is_none());
        assert!(policy.bucket_for(Role::Disabled).is_none());
        // The original model never defined a super-admin bucket either;
        // super admins bypass policy resolution entirely.
        assert!(policy.bucket_for(Role::SuperAdmin).is_none());
    }

    #[test]
    fn test_admin_bucket_is_optional() {
        let policy = ResourcePolicy::new().owner(&["read"]).public(&["read"]);
        assert!(policy.bucket_for(Role::Admin).is_none());
    }
}
