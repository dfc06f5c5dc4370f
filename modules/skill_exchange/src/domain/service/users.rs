use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{required_text, storage, Service};
use crate::contract::model::{NewUser, ProfileUpdate, User, UserListing, UserProfile};
use crate::domain::error::DomainError;
use crate::domain::events::SkillExchangeEvent;
use crate::domain::rating::summarize;
use crate::domain::repo::UniqueViolation;

impl Service {
    #[instrument(name = "skill_exchange.service.create_user", skip(self, new_user), fields(email = %new_user.email))]
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        info!("Creating new user");

        let name = required_text("name", &new_user.name, self.config.max_name_length)?;
        let email = normalize_email(&new_user.email)?;

        if self
            .users
            .find_by_email(&email)
            .await
            .map_err(storage)?
            .is_some()
        {
            return Err(DomainError::email_already_exists(email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            can_teach: new_user.can_teach.trim().to_owned(),
            want_to_learn: new_user.want_to_learn.trim().to_owned(),
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.users.insert(user.clone()).await {
            // Lost a race against a concurrent signup with the same email.
            if e.downcast_ref::<UniqueViolation>().is_some() {
                warn!("Email uniqueness enforced by storage");
                return Err(DomainError::email_already_exists(user.email));
            }
            return Err(storage(e));
        }

        self.events
            .publish(&SkillExchangeEvent::UserRegistered { user_id: user.id });
        info!(user_id = %user.id, "Successfully created user");
        Ok(user)
    }

    #[instrument(name = "skill_exchange.service.get_user", skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        debug!("Getting user by id");
        self.users
            .find_by_id(id)
            .await
            .map_err(storage)?
            .ok_or_else(|| DomainError::user_not_found(id))
    }

    /// The public profile: the user plus their rating summary.
    #[instrument(name = "skill_exchange.service.get_user_profile", skip(self), fields(user_id = %id))]
    pub async fn get_user_profile(&self, id: Uuid) -> Result<UserProfile, DomainError> {
        let user = self.get_user(id).await?;
        let stars = self.ratings.stars_for(id).await.map_err(storage)?;
        let summary = summarize(&stars);
        debug!(total_reviews = summary.total_reviews, "Loaded profile");
        Ok(UserProfile { user, summary })
    }

    #[instrument(name = "skill_exchange.service.update_profile", skip(self, update), fields(user_id = %id))]
    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, DomainError> {
        info!("Updating profile");

        let name = required_text("name", &update.name, self.config.max_name_length)?;
        let mut user = self.get_user(id).await?;

        user.name = name;
        if let Some(can_teach) = update.can_teach {
            user.can_teach = can_teach.trim().to_owned();
        }
        if let Some(want_to_learn) = update.want_to_learn {
            user.want_to_learn = want_to_learn.trim().to_owned();
        }
        user.updated_at = Utc::now();

        self.users.update(user.clone()).await.map_err(storage)?;
        info!("Successfully updated profile");
        Ok(user)
    }

    /// Every user with the requests still waiting in their inbox.
    #[instrument(name = "skill_exchange.service.list_users", skip(self))]
    pub async fn list_users(&self) -> Result<Vec<UserListing>, DomainError> {
        let users = self.users.list_all().await.map_err(storage)?;
        let pending = self.requests.list_all_pending().await.map_err(storage)?;

        let mut by_owner: HashMap<Uuid, Vec<_>> = HashMap::new();
        for req in pending {
            by_owner.entry(req.owner_id).or_default().push(req);
        }

        let listings: Vec<UserListing> = users
            .into_iter()
            .map(|user| UserListing {
                pending: by_owner.remove(&user.id).unwrap_or_default(),
                user,
            })
            .collect();
        debug!("Listed {} users", listings.len());
        Ok(listings)
    }
}

/// Lowercased, trimmed `local@domain.tld`.
pub(crate) fn normalize_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(DomainError::invalid_input(
            "email",
            format!("'{}' is not a valid address", raw.trim()),
        ));
    }
    Ok(email)
}
