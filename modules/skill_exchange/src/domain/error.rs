use thiserror::Error;
use uuid::Uuid;

/// Stable classification of domain failures, used for HTTP mapping and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    DuplicatePending,
    AlreadyAccepted,
    DuplicateKey,
    PairingRequired,
    PartialMirrorFailure,
    Unauthorized,
    StorageFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::DuplicatePending => "DuplicatePending",
            ErrorKind::AlreadyAccepted => "AlreadyAccepted",
            ErrorKind::DuplicateKey => "DuplicateKey",
            ErrorKind::PairingRequired => "PairingRequired",
            ErrorKind::PartialMirrorFailure => "PartialMirrorFailure",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::StorageFailure => "StorageFailure",
        }
    }
}

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid {field}: {message}")]
    InvalidInput { field: String, message: String },

    #[error("User not found: {id}")]
    UserNotFound { id: Uuid },

    #[error("Request not found: {id}")]
    RequestNotFound { id: Uuid },

    #[error("A pending request for this skill already exists")]
    DuplicatePending,

    #[error("An accepted request for this skill already exists")]
    AlreadyAccepted,

    #[error("User with email '{email}' already exists")]
    EmailAlreadyExists { email: String },

    #[error("Users can only rate someone they have an accepted request with")]
    PairingRequired,

    #[error("Request {request_id} could not be mirrored: sender {sender_id} does not exist")]
    MirrorFailure { request_id: Uuid, sender_id: Uuid },

    #[error("Missing or invalid session token")]
    Unauthorized,

    #[error("Database error: {message}")]
    Database { message: String },
}

impl DomainError {
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn user_not_found(id: Uuid) -> Self {
        Self::UserNotFound { id }
    }

    pub fn request_not_found(id: Uuid) -> Self {
        Self::RequestNotFound { id }
    }

    pub fn email_already_exists(email: String) -> Self {
        Self::EmailAlreadyExists { email }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::InvalidInput { .. } => ErrorKind::InvalidInput,
            DomainError::UserNotFound { .. } | DomainError::RequestNotFound { .. } => {
                ErrorKind::NotFound
            }
            DomainError::DuplicatePending => ErrorKind::DuplicatePending,
            DomainError::AlreadyAccepted => ErrorKind::AlreadyAccepted,
            DomainError::EmailAlreadyExists { .. } => ErrorKind::DuplicateKey,
            DomainError::PairingRequired => ErrorKind::PairingRequired,
            DomainError::MirrorFailure { .. } => ErrorKind::PartialMirrorFailure,
            DomainError::Unauthorized => ErrorKind::Unauthorized,
            DomainError::Database { .. } => ErrorKind::StorageFailure,
        }
    }
}
