//! Stateless session tokens: `<user id>.<expiry unix secs>.<hex HMAC-SHA256>`.

use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ports::SessionGuard;

type HmacSha256 = Hmac<Sha256>;

pub struct HmacSessionGuard {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for HmacSessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSessionGuard")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl HmacSessionGuard {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> anyhow::Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| anyhow::anyhow!("invalid session key"))
    }

    /// Issue a token for `user_id` valid for the configured TTL.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        self.issue_at(user_id, Utc::now())
    }

    pub fn issue_at(&self, user_id: Uuid, now: DateTime<Utc>) -> anyhow::Result<String> {
        let ttl = i64::try_from(self.ttl.as_secs()).context("ttl out of range")?;
        let expires = now.timestamp().saturating_add(ttl);
        let payload = format!("{user_id}.{expires}");
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let sig = hex::encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{sig}"))
    }

    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Result<Uuid, DomainError> {
        let mut parts = token.split('.');
        let (Some(id), Some(expires), Some(sig), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(DomainError::Unauthorized);
        };

        let sig = hex::decode(sig).map_err(|_| DomainError::Unauthorized)?;
        let mut mac = self.mac().map_err(|_| DomainError::Unauthorized)?;
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(expires.as_bytes());
        // Constant-time comparison.
        mac.verify_slice(&sig)
            .map_err(|_| DomainError::Unauthorized)?;

        let expires: i64 = expires.parse().map_err(|_| DomainError::Unauthorized)?;
        if now.timestamp() >= expires {
            return Err(DomainError::Unauthorized);
        }
        Uuid::parse_str(id).map_err(|_| DomainError::Unauthorized)
    }
}

impl SessionGuard for HmacSessionGuard {
    fn resolve(&self, token: &str) -> Result<Uuid, DomainError> {
        self.resolve_at(token, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> HmacSessionGuard {
        HmacSessionGuard::new("test-secret", Duration::from_secs(3600))
    }

    #[test]
    fn issued_token_resolves_to_user() {
        let user = Uuid::new_v4();
        let token = guard().issue(user).unwrap();
        assert_eq!(guard().resolve(&token).unwrap(), user);
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = Uuid::new_v4();
        let issued = Utc::now() - chrono::Duration::hours(2);
        let token = guard().issue_at(user, issued).unwrap();
        assert!(matches!(
            guard().resolve(&token),
            Err(DomainError::Unauthorized)
        ));
    }

    #[test]
    fn tampered_user_id_is_rejected() {
        let token = guard().issue(Uuid::new_v4()).unwrap();
        let (_, rest) = token.split_once('.').unwrap();
        let forged = format!("{}.{rest}", Uuid::new_v4());
        assert!(guard().resolve(&forged).is_err());
    }

    #[test]
    fn other_key_is_rejected() {
        let token = guard().issue(Uuid::new_v4()).unwrap();
        let other = HmacSessionGuard::new("another-secret", Duration::from_secs(3600));
        assert!(other.resolve(&token).is_err());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        for bad in ["", "abc", "a.b", "a.b.c.d", "not-a-uuid.123.zz"] {
            assert!(guard().resolve(bad).is_err(), "{bad:?} should be rejected");
        }
    }
}
