use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found")]
    NotFound,
    #[error("Contract violation: {0}")]
    ContractViolation(String),
    #[error("Repository error: {0}")]
    Repository(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Render error: {0}")]
    Render(String),
}

/// Which side of the boundary an error came from. Expected absences (an
/// unmetered variable item, missing payment settings, unparsable amounts)
/// never surface as errors at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    ContractViolation,
    Collaborator,
}

impl DomainError {
    pub fn contract(msg: impl Into<String>) -> Self {
        DomainError::ContractViolation(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            DomainError::ContractViolation(_) => ErrorCategory::ContractViolation,
            DomainError::NotFound
            | DomainError::Repository(_)
            | DomainError::Storage(_)
            | DomainError::Render(_) => ErrorCategory::Collaborator,
        }
    }
}
