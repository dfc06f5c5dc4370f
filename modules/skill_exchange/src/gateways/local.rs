use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::contract::{
    client::SkillExchangeApi,
    error::SkillExchangeError,
    model::{
        Message, MyRequests, NewSkillRequest, NewUser, ProfileUpdate, RatingSummary, SkillRequest,
        User, UserProfile,
    },
};
use crate::domain::service::Service;

/// Local implementation of the SkillExchangeApi trait that delegates to the domain service
pub struct SkillExchangeLocalClient {
    service: Arc<Service>,
}

impl SkillExchangeLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl SkillExchangeApi for SkillExchangeLocalClient {
    async fn create_user(&self, new_user: NewUser) -> Result<User, SkillExchangeError> {
        self.service.create_user(new_user).await.map_err(Into::into)
    }

    async fn get_user_profile(&self, id: Uuid) -> Result<UserProfile, SkillExchangeError> {
        self.service.get_user_profile(id).await.map_err(Into::into)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<User, SkillExchangeError> {
        self.service
            .update_profile(user_id, update)
            .await
            .map_err(Into::into)
    }

    async fn send_request(
        &self,
        from_id: Uuid,
        req: NewSkillRequest,
    ) -> Result<SkillRequest, SkillExchangeError> {
        self.service
            .send_request(from_id, req)
            .await
            .map_err(Into::into)
    }

    async fn list_requests(&self, user_id: Uuid) -> Result<MyRequests, SkillExchangeError> {
        self.service.list_requests(user_id).await.map_err(Into::into)
    }

    async fn accept_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<SkillRequest, SkillExchangeError> {
        self.service
            .accept_request(user_id, request_id)
            .await
            .map_err(Into::into)
    }

    async fn decline_request(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), SkillExchangeError> {
        self.service
            .decline_request(user_id, request_id)
            .await
            .map_err(Into::into)
    }

    async fn delete_accepted(
        &self,
        user_id: Uuid,
        request_id: Uuid,
    ) -> Result<(), SkillExchangeError> {
        self.service
            .delete_accepted(user_id, request_id)
            .await
            .map_err(Into::into)
    }

    async fn send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Result<Message, SkillExchangeError> {
        self.service
            .send_message(sender_id, receiver_id, content)
            .await
            .map_err(Into::into)
    }

    async fn message_history(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, SkillExchangeError> {
        self.service
            .message_history(user_id, other_id)
            .await
            .map_err(Into::into)
    }

    async fn submit_rating(
        &self,
        rater_id: Uuid,
        ratee_id: Uuid,
        stars: i64,
    ) -> Result<RatingSummary, SkillExchangeError> {
        self.service
            .submit_rating(rater_id, ratee_id, stars)
            .await
            .map_err(Into::into)
    }
}
