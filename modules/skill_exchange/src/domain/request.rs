//! Pure request lifecycle rules: the skill key and the accept mirror.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::contract::model::{RequestStatus, SkillRequest, SkillRole};

/// Case-insensitive key used to compare skills for duplicate detection.
pub fn skill_key(skill: &str) -> String {
    skill.to_lowercase()
}

/// A fresh pending entry for `owner_id`'s inbox.
pub fn new_pending(
    owner_id: Uuid,
    from_id: Uuid,
    skill: String,
    role: SkillRole,
    now: DateTime<Utc>,
) -> SkillRequest {
    SkillRequest {
        id: Uuid::new_v4(),
        owner_id,
        from_id,
        skill,
        role,
        status: RequestStatus::Pending,
        created_at: now,
        accepted_at: None,
    }
}

/// The entry placed in the original sender's accepted list when `accepted`
/// is accepted. The counterpart becomes the accepter and the role flips.
pub fn mirror_of(accepted: &SkillRequest, now: DateTime<Utc>) -> SkillRequest {
    SkillRequest {
        id: Uuid::new_v4(),
        owner_id: accepted.from_id,
        from_id: accepted.owner_id,
        skill: accepted.skill.clone(),
        role: accepted.role.inverted(),
        status: RequestStatus::Accepted,
        created_at: now,
        accepted_at: Some(now),
    }
}
