//! Unified error handling
//!
//! A single error type for infrastructure-level failures. Authorization
//! outcomes are not errors and live in `sadhana-access`.

use thiserror::Error;

pub type SadhanaResult<T> = Result<T, SadhanaError>;

/// Top-level error type for the sadhana platform
#[derive(Error, Debug)]
pub enum SadhanaError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SadhanaError {
    /// Configuration errors indicate a bad deployment and are never retryable
    pub fn is_recoverable(&self) -> bool {
        match self {
            SadhanaError::Server(_) => true,
            SadhanaError::Serialization(_) => false,
            SadhanaError::Config(_) => false,
            SadhanaError::Internal(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_not_recoverable() {
        let err = SadhanaError::Config("missing bind address".to_string());
        assert!(!err.is_recoverable());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing bind address"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: SadhanaError = io.into();
        assert!(err.is_recoverable());
    }
}
