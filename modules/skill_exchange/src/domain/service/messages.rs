use chrono::Utc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{storage, Service};
use crate::contract::model::Message;
use crate::domain::error::DomainError;
use crate::domain::events::SkillExchangeEvent;

impl Service {
    /// Appends a message. Content is stored verbatim; the receiver is not
    /// required to exist.
    #[instrument(
        name = "skill_exchange.service.send_message",
        skip(self, content),
        fields(sender_id = %sender_id, receiver_id = %receiver_id)
    )]
    pub async fn send_message(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        content: String,
    ) -> Result<Message, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::invalid_input("text", "must not be empty"));
        }
        let len = content.chars().count();
        let max = self.config.max_message_length;
        if len > max {
            return Err(DomainError::invalid_input(
                "text",
                format!("too long: {len} characters (max: {max})"),
            ));
        }

        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            content,
            created_at: Utc::now(),
        };
        self.messages
            .insert(message.clone())
            .await
            .map_err(storage)?;

        self.events.publish(&SkillExchangeEvent::MessageSent {
            message_id: message.id,
            sender_id,
            receiver_id,
        });
        info!(message_id = %message.id, "Message sent");
        Ok(message)
    }

    /// Both directions of the conversation, oldest first.
    #[instrument(
        name = "skill_exchange.service.message_history",
        skip(self),
        fields(user_id = %user_id, other_id = %other_id)
    )]
    pub async fn message_history(
        &self,
        user_id: Uuid,
        other_id: Uuid,
    ) -> Result<Vec<Message>, DomainError> {
        let messages = self
            .messages
            .conversation(user_id, other_id)
            .await
            .map_err(storage)?;
        debug!("Loaded {} messages", messages.len());
        Ok(messages)
    }
}
