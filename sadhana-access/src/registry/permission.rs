//! Permission catalog
//!
//! Permissions are namespaced `"domain:action"` identifiers. They carry no
//! hierarchy of their own; privilege comes only from which sets contain
//! them. `ALL` is the complete catalog and the basis for the super-admin
//! union invariant.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Namespaced action identifier granted to one or more roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    // User management
    UserCreate,
    UserRead,
    UserReadOwn,
    UserUpdate,
    UserUpdateOwn,
    UserDelete,
    UserList,

    // Profile management
    ProfileRead,
    ProfileReadOwn,
    ProfileUpdate,
    ProfileUpdateOwn,

    // Sadhana management
    SadhanaCreate,
    SadhanaRead,
    SadhanaReadOwn,
    SadhanaUpdate,
    SadhanaUpdateOwn,
    SadhanaDelete,
    SadhanaDeleteOwn,
    SadhanaList,

    // Book management
    BookCreate,
    BookRead,
    BookUpdate,
    BookDelete,
    BookList,

    // Community features
    CommunityPostCreate,
    CommunityPostRead,
    CommunityPostUpdateOwn,
    CommunityPostDeleteOwn,
    CommunityPostDeleteAny,
    CommunityComment,
    CommunityLike,
    CommunityModerate,

    // Analytics
    AnalyticsViewOwn,
    AnalyticsViewAll,

    // Administration
    AdminManageUsers,
    AdminManageRoles,
    AdminManageContent,
    AdminViewAnalytics,
    AdminViewLogs,
    AdminSettings,

    // System
    SystemAccess,
}

impl Permission {
    /// Every permission that exists in the system
    pub const ALL: [Permission; 41] = [
        Permission::UserCreate,
        Permission::UserRead,
        Permission::UserReadOwn,
        Permission::UserUpdate,
        Permission::UserUpdateOwn,
        Permission::UserDelete,
        Permission::UserList,
        Permission::ProfileRead,
        Permission::ProfileReadOwn,
        Permission::ProfileUpdate,
        Permission::ProfileUpdateOwn,
        Permission::SadhanaCreate,
        Permission::SadhanaRead,
        Permission::SadhanaReadOwn,
        Permission::SadhanaUpdate,
        Permission::SadhanaUpdateOwn,
        Permission::SadhanaDelete,
        Permission::SadhanaDeleteOwn,
        Permission::SadhanaList,
        Permission::BookCreate,
        Permission::BookRead,
        Permission::BookUpdate,
        Permission::BookDelete,
        Permission::BookList,
        Permission::CommunityPostCreate,
        Permission::CommunityPostRead,
        Permission::CommunityPostUpdateOwn,
        Permission::CommunityPostDeleteOwn,
        Permission::CommunityPostDeleteAny,
        Permission::CommunityComment,
        Permission::CommunityLike,
        Permission::CommunityModerate,
        Permission::AnalyticsViewOwn,
        Permission::AnalyticsViewAll,
        Permission::AdminManageUsers,
        Permission::AdminManageRoles,
        Permission::AdminManageContent,
        Permission::AdminViewAnalytics,
        Permission::AdminViewLogs,
        Permission::AdminSettings,
        Permission::SystemAccess,
    ];

    /// Canonical `"domain:action"` identifier
    pub fn as_str(self) -> &'static str {
        match self {
            Permission::UserCreate => "user:create",
            Permission::UserRead => "user:read",
            Permission::UserReadOwn => "user:read_own",
            Permission::UserUpdate => "user:update",
            Permission::UserUpdateOwn => "user:update_own",
            Permission::UserDelete => "user:delete",
            Permission::UserList => "user:list",
            Permission::ProfileRead => "profile:read",
            Permission::ProfileReadOwn => "profile:read_own",
            Permission::ProfileUpdate => "profile:update",
            Permission::ProfileUpdateOwn => "profile:update_own",
            Permission::SadhanaCreate => "sadhana:create",
            Permission::SadhanaRead => "sadhana:read",
            Permission::SadhanaReadOwn => "sadhana:read_own",
            Permission::SadhanaUpdate => "sadhana:update",
            Permission::SadhanaUpdateOwn => "sadhana:update_own",
            Permission::SadhanaDelete => "sadhana:delete",
            Permission::SadhanaDeleteOwn => "sadhana:delete_own",
            Permission::SadhanaList => "sadhana:list",
            Permission::BookCreate => "book:create",
            Permission::BookRead => "book:read",
            Permission::BookUpdate => "book:update",
            Permission::BookDelete => "book:delete",
            Permission::BookList => "book:list",
            Permission::CommunityPostCreate => "community:post_create",
            Permission::CommunityPostRead => "community:post_read",
            Permission::CommunityPostUpdateOwn => "community:post_update_own",
            Permission::CommunityPostDeleteOwn => "community:post_delete_own",
            Permission::CommunityPostDeleteAny => "community:post_delete_any",
            Permission::CommunityComment => "community:comment",
            Permission::CommunityLike => "community:like",
            Permission::CommunityModerate => "community:moderate",
            Permission::AnalyticsViewOwn => "analytics:view_own",
            Permission::AnalyticsViewAll => "analytics:view_all",
            Permission::AdminManageUsers => "admin:manage_users",
            Permission::AdminManageRoles => "admin:manage_roles",
            Permission::AdminManageContent => "admin:manage_content",
            Permission::AdminViewAnalytics => "admin:view_analytics",
            Permission::AdminViewLogs => "admin:view_logs",
            Permission::AdminSettings => "admin:settings",
            Permission::SystemAccess => "system:access",
        }
    }

    /// The `domain` half of the identifier
    pub fn domain(self) -> &'static str {
        let s = self.as_str();
        &s[..s.find(':').unwrap_or(s.len())]
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Permission {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| format!("Unknown permission: {}", s))
    }
}

impl Serialize for Permission {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
