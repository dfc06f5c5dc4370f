use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{
    error::SkillExchangeError,
    model::{
        Message, MyRequests, NewSkillRequest, NewUser, ProfileUpdate, RatingSummary, SkillRequest,
        User, UserProfile,
    },
};

/// Public API trait for the skill_exchange module that other modules can use.
///
/// Every call takes the acting user's id explicitly; authentication happens at
/// the edge.
#[async_trait]
pub trait SkillExchangeApi: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> Result<User, SkillExchangeError>;

    async fn get_user_profile(&self, id: Uuid) -> Result<UserProfile, SkillExchangeError>;

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, SkillExchangeError>;

    async fn send_request(
        &self,
        from_id: Uuid,
        req: NewSkillRequest,
    ) -> Result<SkillRequest, SkillExchangeError>;

    async fn list_requests(&self, user_id: Uuid) -> Result<MyRequests, SkillExchangeError>;

    async fn accept_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<SkillRequest, SkillExchangeError>;

    async fn decline_request(&self, user_id: Uuid, request_id: Uuid)
        -> Result<(), SkillExchangeError>;

    async fn delete_accepted(&self, user_id: Uuid, request_id: Uuid)
        -> Result<(), SkillExchangeError>;

    async fn send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Result<Message, SkillExchangeError>;

    async fn message_history(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, SkillExchangeError>;

    async fn submit_rating(
        &self,
        rater_id: Uuid,
        ratee_id: Uuid,
        stars: i64,
    ) -> Result<RatingSummary, SkillExchangeError>;
}
