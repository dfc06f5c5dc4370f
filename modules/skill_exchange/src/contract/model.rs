use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Transport-agnostic user profile. No credential material lives here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub can_teach: String,
    pub want_to_learn: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub can_teach: String,
    pub want_to_learn: String,
}

/// Profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: String,
    pub can_teach: Option<String>,
    pub want_to_learn: Option<String>,
}

/// The minimal view of a counterpart shown next to requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        }
    }
}

/// What the sender of a request wants out of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkillRole {
    Learn,
    Teach,
}

impl SkillRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillRole::Learn => "learn",
            SkillRole::Teach => "teach",
        }
    }

    /// Exact, case-sensitive match on the wire value.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "learn" => Some(SkillRole::Learn),
            "teach" => Some(SkillRole::Teach),
            _ => None,
        }
    }

    /// The role as seen from the other side of the pairing.
    pub fn inverted(self) -> Self {
        match self {
            SkillRole::Learn => SkillRole::Teach,
            SkillRole::Teach => SkillRole::Learn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStatus {
    Pending,
    Accepted,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Accepted => "accepted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "accepted" => Some(RequestStatus::Accepted),
            _ => None,
        }
    }
}

/// A request as stored in its owner's inbox.
///
/// `owner_id` is the user whose sequence holds the entry, `from_id` is the
/// counterpart. For mirrored entries `from_id` is the user who accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRequest {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub from_id: Uuid,
    pub skill: String,
    pub role: SkillRole,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Input for sending a request. `role` is the raw wire value and is validated
/// by the service.
#[derive(Debug, Clone, Default)]
pub struct NewSkillRequest {
    pub to_user_id: Uuid,
    pub skill: String,
    pub role: String,
}

/// A request with its counterpart resolved. `from` is `None` when the
/// counterpart account no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestView {
    pub id: Uuid,
    pub from: Option<UserRef>,
    pub skill: String,
    pub role: SkillRole,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Both halves of a user's inbox, each in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MyRequests {
    pub pending: Vec<RequestView>,
    pub accepted: Vec<RequestView>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    /// Mean of all stars rounded to one decimal, 0 when there are no ratings.
    pub average_rating: f64,
    pub total_reviews: u64,
}

/// A user together with their rating summary.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub summary: RatingSummary,
}

/// Directory entry: a user and the requests still waiting on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserListing {
    pub user: User,
    pub pending: Vec<SkillRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_is_exact() {
        assert_eq!(SkillRole::parse("learn"), Some(SkillRole::Learn));
        assert_eq!(SkillRole::parse("teach"), Some(SkillRole::Teach));
        assert_eq!(SkillRole::parse("Teach"), None);
        assert_eq!(SkillRole::parse("mentor"), None);
        assert_eq!(SkillRole::parse(""), None);
    }

    #[test]
    fn role_inversion_is_symmetric() {
        assert_eq!(SkillRole::Learn.inverted(), SkillRole::Teach);
        assert_eq!(SkillRole::Teach.inverted().inverted(), SkillRole::Teach);
    }

    #[test]
    fn status_round_trips_through_wire_value() {
        for s in [RequestStatus::Pending, RequestStatus::Accepted] {
            assert_eq!(RequestStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(RequestStatus::parse("declined"), None);
    }
}
