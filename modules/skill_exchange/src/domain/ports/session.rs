use uuid::Uuid;

use crate::domain::error::DomainError;

/// Turns a presented credential into the authenticated user's id.
///
/// Fails with `DomainError::Unauthorized` for missing, malformed, forged or
/// expired tokens.
pub trait SessionGuard: Send + Sync + 'static {
    fn resolve(&self, token: &str) -> Result<Uuid, DomainError>;
}
