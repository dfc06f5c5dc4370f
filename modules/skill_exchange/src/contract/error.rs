use thiserror::Error;
use uuid::Uuid;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkillExchangeError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("A pending request for this skill already exists")]
    DuplicatePending,

    #[error("An accepted request for this skill already exists")]
    AlreadyAccepted,

    #[error("User with email '{email}' already exists")]
    Conflict { email: String },

    #[error("Rating requires an accepted pairing")]
    PairingRequired,

    #[error("Request {request_id} could not be mirrored")]
    MirrorFailed { request_id: Uuid },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error")]
    Internal,
}

impl SkillExchangeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }
}

impl From<crate::domain::error::DomainError> for SkillExchangeError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            InvalidInput { field, message } => Self::validation(format!("{field}: {message}")),
            UserNotFound { id } => Self::UserNotFound { id },
            RequestNotFound { id } => Self::RequestNotFound { id },
            DuplicatePending => Self::DuplicatePending,
            AlreadyAccepted => Self::AlreadyAccepted,
            EmailAlreadyExists { email } => Self::Conflict { email },
            PairingRequired => Self::PairingRequired,
            MirrorFailure { request_id, .. } => Self::MirrorFailed { request_id },
            Unauthorized => Self::Unauthorized,
            Database { .. } => Self::internal(),
        }
    }
}
