//! Role hierarchy
//!
//! Roles are declared in hierarchy order, lowest privilege first. The
//! declaration order is the single source of truth: `HIERARCHY`, the
//! derived `Ord`, and `rank()` all follow it.

use serde::{Deserialize, Serialize};

/// Actor privilege category
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Disabled,
    Guest,
    User,
    Mentor,
    Admin,
    SuperAdmin,
}

impl Role {
    /// All roles, lowest privilege first. Rank is the index in this sequence.
    pub const HIERARCHY: [Role; 6] = [
        Role::Disabled,
        Role::Guest,
        Role::User,
        Role::Mentor,
        Role::Admin,
        Role::SuperAdmin,
    ];

    /// Zero-based position in the hierarchy
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Canonical wire form, matching the stored role strings
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Disabled => "DISABLED",
            Role::Guest => "GUEST",
            Role::User => "USER",
            Role::Mentor => "MENTOR",
            Role::Admin => "ADMIN",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DISABLED" => Ok(Role::Disabled),
            "GUEST" => Ok(Role::Guest),
            "USER" => Ok(Role::User),
            "MENTOR" => Ok(Role::Mentor),
            "ADMIN" => Ok(Role::Admin),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_matches_declaration_order() {
        for (index, role) in Role::HIERARCHY.iter().enumerate() {
            assert_eq!(role.rank(), index);
        }
    }

    #[test]
    fn test_derived_order_agrees_with_hierarchy() {
        for pair in Role::HIERARCHY.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!(Role::SuperAdmin > Role::Admin);
        assert!(Role::Disabled < Role::Guest);
    }

    #[test]
    fn test_round_trip_through_string() {
        for role in Role::HIERARCHY {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("mentor".parse::<Role>().unwrap(), Role::Mentor);
        assert!("overlord".parse::<Role>().is_err());
    }

    #[test]
    fn test_serde_uses_wire_strings() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPER_ADMIN\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::SuperAdmin);
    }
}
