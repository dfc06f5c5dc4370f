use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{Message, RequestStatus, SkillRequest, User};

/// Returned (inside `anyhow::Error`) when a write hits a unique constraint.
#[derive(Debug, thiserror::Error)]
#[error("unique constraint violated: {constraint}")]
pub struct UniqueViolation {
    pub constraint: String,
}

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>>;
    /// Fails with [`UniqueViolation`] when the email is taken.
    async fn insert(&self, user: User) -> anyhow::Result<()>;
    async fn update(&self, user: User) -> anyhow::Result<()>;
    async fn list_all(&self) -> anyhow::Result<Vec<User>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Inserted,
    DuplicatePending,
    AlreadyAccepted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptOutcome {
    /// `accepted` is the owner's entry for the exchange. `mirror` is `None`
    /// when the sender already held their side of it.
    Accepted {
        accepted: SkillRequest,
        mirror: Option<SkillRequest>,
    },
    NotFound,
    /// The sender's account is gone; nothing was changed.
    CounterpartMissing { sender_id: Uuid },
}

#[async_trait]
pub trait RequestsRepository: Send + Sync {
    /// Atomically checks the recipient's inbox for the same (sender, skill, role)
    /// and inserts `req` only when neither a pending nor an accepted entry exists.
    /// A pending duplicate is reported before an accepted one.
    async fn insert_pending_if_absent(&self, req: SkillRequest) -> anyhow::Result<SendOutcome>;

    /// Pending entries in arrival order; accepted entries in acceptance order.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: RequestStatus,
    ) -> anyhow::Result<Vec<SkillRequest>>;

    async fn list_all_pending(&self) -> anyhow::Result<Vec<SkillRequest>>;

    /// Moves the pending entry to accepted and inserts the sender's mirror in
    /// one transaction. When crossed requests leave the owner already holding
    /// the same accepted exchange, the pending entry is removed instead and
    /// the existing entry is returned; neither list gains a duplicate.
    async fn accept_and_mirror(
        &self,
        owner_id: Uuid,
        request_id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> anyhow::Result<AcceptOutcome>;

    /// Returns whether an entry was removed.
    async fn delete_for_owner(
        &self,
        owner_id: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> anyhow::Result<bool>;

    /// True when either user holds an accepted entry naming the other.
    async fn has_accepted_pairing(&self, a: Uuid, b: Uuid) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait RatingsRepository: Send + Sync {
    /// Inserts or replaces the rating `rater_id` gave `ratee_id`.
    async fn upsert(
        &self,
        ratee_id: Uuid,
        rater_id: Uuid,
        stars: i32,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()>;

    async fn stars_for(&self, ratee_id: Uuid) -> anyhow::Result<Vec<i32>>;
}

#[async_trait]
pub trait MessagesRepository: Send + Sync {
    async fn insert(&self, message: Message) -> anyhow::Result<()>;

    /// Every message between `a` and `b` in either direction, oldest first.
    async fn conversation(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>>;
}
