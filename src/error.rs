use thiserror::Error;

/// Raised when the facade is constructed without usable credentials.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AWS Service credentials are not configured: {0} is missing")]
    MissingCredential(&'static str),
    #[error("AWS Service credentials are not configured: {0} is empty")]
    EmptyCredential(&'static str),
}

/// Failure of a single provider call, as reported by the SDK.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{code}: {message}")]
    NotFound { code: String, message: String },
    #[error("{}: {message}", .code.as_deref().unwrap_or("unhandled"))]
    Service {
        code: Option<String>,
        message: String,
    },
    /// The call succeeded but the response lacked a field we depend on.
    #[error("response is missing {0}")]
    Malformed(&'static str),
}

impl ProviderError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ProviderError::NotFound { .. })
    }
}

/// Outcome of a failed facade operation.
///
/// Unlike a plain boolean, callers can tell a missing resource apart from
/// a provider failure and from a failed prerequisite lookup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("failed to {operation}: {resource} does not exist")]
    NotFound {
        operation: &'static str,
        resource: String,
    },
    #[error("failed to {operation}: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
    /// A lookup the operation depends on failed, so the operation itself was not attempted.
    #[error("failed to {operation}: prerequisite lookup failed: {source}")]
    Precondition {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl ServiceError {
    pub fn operation(&self) -> &'static str {
        match self {
            ServiceError::NotFound { operation, .. }
            | ServiceError::Provider { operation, .. }
            | ServiceError::Precondition { operation, .. } => operation,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
