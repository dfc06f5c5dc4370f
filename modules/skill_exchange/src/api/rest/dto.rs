use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    Message, NewUser, ProfileUpdate, RatingSummary, RequestView, SkillRequest, User, UserListing,
    UserProfile, UserRef,
};

/// Plain `{ "message": .. }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResp {
    pub message: String,
}

impl MessageResp {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// --- users ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupReq {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub can_teach: String,
    #[serde(default)]
    pub want_to_learn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummaryDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupResp {
    pub message: String,
    pub user: UserSummaryDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileReq {
    #[serde(default)]
    pub name: String,
    pub can_teach: Option<String>,
    pub want_to_learn: Option<String>,
}

/// REST DTO for user representation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub can_teach: String,
    pub want_to_learn: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserDto,
}

/// A user with their rating summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub average_rating: f64,
    pub total_reviews: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileEnvelope {
    pub user: UserProfileDto,
}

/// Directory entry: a user and the requests waiting on them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListedUserDto {
    #[serde(flatten)]
    pub user: UserDto,
    pub requests: Vec<PendingRequestDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PendingRequestDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub from: Uuid,
    pub skill: String,
    #[serde(rename = "type")]
    pub role: String,
}

// --- requests ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendRequestReq {
    pub to_user_id: Option<String>,
    #[serde(default)]
    pub skill: String,
    #[serde(default, rename = "type")]
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SentRequestDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub to: Uuid,
    pub skill: String,
    #[serde(rename = "type")]
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendRequestResp {
    pub message: String,
    pub request: SentRequestDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestIdReq {
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// `null` when the counterpart account no longer exists.
    pub from: Option<UserSummaryDto>,
    pub skill: String,
    #[serde(rename = "type")]
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyRequestsResp {
    pub requests: Vec<RequestDto>,
    pub accepted_requests: Vec<RequestDto>,
}

// --- messages ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageReq {
    pub to_user_id: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub sender: Uuid,
    pub receiver: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageResp {
    pub message: String,
    pub data: MessageDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessagesResp {
    pub messages: Vec<MessageDto>,
}

// --- ratings ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RateUserReq {
    pub mentor_id: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummaryDto {
    pub average_rating: f64,
    pub total_reviews: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateUserResp {
    pub message: String,
    pub summary: RatingSummaryDto,
}

// Conversion implementations between REST DTOs and contract models

impl From<SignupReq> for NewUser {
    fn from(req: SignupReq) -> Self {
        Self {
            name: req.name,
            email: req.email,
            can_teach: req.can_teach,
            want_to_learn: req.want_to_learn,
        }
    }
}

impl From<UpdateProfileReq> for ProfileUpdate {
    fn from(req: UpdateProfileReq) -> Self {
        Self {
            name: req.name,
            can_teach: req.can_teach,
            want_to_learn: req.want_to_learn,
        }
    }
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            can_teach: u.can_teach,
            want_to_learn: u.want_to_learn,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

impl From<&User> for UserSummaryDto {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
        }
    }
}

impl From<UserRef> for UserSummaryDto {
    fn from(u: UserRef) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

impl From<UserProfile> for UserProfileDto {
    fn from(p: UserProfile) -> Self {
        Self {
            user: p.user.into(),
            average_rating: p.summary.average_rating,
            total_reviews: p.summary.total_reviews,
        }
    }
}

impl From<SkillRequest> for PendingRequestDto {
    fn from(r: SkillRequest) -> Self {
        Self {
            id: r.id,
            from: r.from_id,
            skill: r.skill,
            role: r.role.as_str().to_owned(),
        }
    }
}

impl From<UserListing> for ListedUserDto {
    fn from(l: UserListing) -> Self {
        Self {
            user: l.user.into(),
            requests: l.pending.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<SkillRequest> for SentRequestDto {
    fn from(r: SkillRequest) -> Self {
        Self {
            id: r.id,
            to: r.owner_id,
            skill: r.skill,
            role: r.role.as_str().to_owned(),
            status: r.status.as_str().to_owned(),
            created_at: r.created_at,
        }
    }
}

impl From<RequestView> for RequestDto {
    fn from(r: RequestView) -> Self {
        Self {
            id: r.id,
            from: r.from.map(Into::into),
            skill: r.skill,
            role: r.role.as_str().to_owned(),
            status: r.status.as_str().to_owned(),
            created_at: r.created_at,
            accepted_at: r.accepted_at,
        }
    }
}

impl From<Message> for MessageDto {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            sender: m.sender_id,
            receiver: m.receiver_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}

impl From<RatingSummary> for RatingSummaryDto {
    fn from(s: RatingSummary) -> Self {
        Self {
            average_rating: s.average_rating,
            total_reviews: s.total_reviews,
        }
    }
}
