//! Domain service for the skill exchange: users, the request lifecycle,
//! ratings and messages. Split by concern into sibling files, all operating on
//! the same [`Service`].

use std::sync::Arc;

use crate::domain::error::DomainError;
use crate::domain::events::SkillExchangeEvent;
use crate::domain::ports::EventPublisher;
use crate::domain::repo::{
    MessagesRepository, RatingsRepository, RequestsRepository, UsersRepository,
};

mod messages;
mod ratings;
mod requests;
mod users;

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_name_length: usize,
    pub max_skill_length: usize,
    pub max_message_length: usize,
    pub require_pairing_for_rating: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_name_length: 100,
            max_skill_length: 200,
            max_message_length: 4000,
            require_pairing_for_rating: false,
        }
    }
}

/// Storage ports the service depends on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UsersRepository>,
    pub requests: Arc<dyn RequestsRepository>,
    pub ratings: Arc<dyn RatingsRepository>,
    pub messages: Arc<dyn MessagesRepository>,
}

/// Domain service containing the business logic of the exchange.
/// Depends only on repository and event ports.
#[derive(Clone)]
pub struct Service {
    users: Arc<dyn UsersRepository>,
    requests: Arc<dyn RequestsRepository>,
    ratings: Arc<dyn RatingsRepository>,
    messages: Arc<dyn MessagesRepository>,
    events: Arc<dyn EventPublisher<SkillExchangeEvent>>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        repos: Repositories,
        events: Arc<dyn EventPublisher<SkillExchangeEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            users: repos.users,
            requests: repos.requests,
            ratings: repos.ratings,
            messages: repos.messages,
            events,
            config,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Trimmed, non-empty and at most `max` characters.
fn required_text(field: &str, raw: &str, max: usize) -> Result<String, DomainError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(DomainError::invalid_input(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len > max {
        return Err(DomainError::invalid_input(
            field,
            format!("too long: {len} characters (max: {max})"),
        ));
    }
    Ok(value.to_owned())
}

fn storage(e: anyhow::Error) -> DomainError {
    DomainError::database(format!("{e:#}"))
}
