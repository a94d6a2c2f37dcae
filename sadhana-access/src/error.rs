//! Authorization failure taxonomy
//!
//! Lookup-style operations never fail; they degrade to "no access". Only
//! the validators produce these classifications, and all three are
//! terminal, caller-facing outcomes.

use thiserror::Error;

pub type AccessResult<T> = Result<T, AccessError>;

/// Terminal authorization failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No actor is attached to the request
    #[error("Authentication required")]
    Unauthenticated,

    /// Actor present but lacks the role, permission or ownership
    #[error("{0}")]
    Forbidden(String),

    /// Attempted grant exceeds the assigner's own rank
    #[error("{0}")]
    InvalidRoleAssignment(String),
}

impl AccessError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        AccessError::Forbidden(message.into())
    }

    /// Stable machine-readable classification
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::Unauthenticated => "UNAUTHENTICATED",
            AccessError::Forbidden(_) => "FORBIDDEN",
            AccessError::InvalidRoleAssignment(_) => "INVALID_ROLE_ASSIGNMENT",
        }
    }
}
