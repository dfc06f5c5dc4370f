use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{storage, Service};
use crate::contract::model::RatingSummary;
use crate::domain::error::DomainError;
use crate::domain::events::SkillExchangeEvent;
use crate::domain::rating::{stars_in_range, summarize, MAX_STARS, MIN_STARS};

impl Service {
    /// Records or replaces `rater_id`'s rating of `ratee_id` and returns the
    /// ratee's fresh summary.
    #[instrument(
        name = "skill_exchange.service.submit_rating",
        skip(self),
        fields(rater_id = %rater_id, ratee_id = %ratee_id)
    )]
    pub async fn submit_rating(
        &self,
        rater_id: Uuid,
        ratee_id: Uuid,
        stars: i64,
    ) -> Result<RatingSummary, DomainError> {
        info!("Submitting rating");

        if !stars_in_range(stars) {
            return Err(DomainError::invalid_input(
                "rating",
                format!("must be between {MIN_STARS} and {MAX_STARS}"),
            ));
        }

        self.get_user(ratee_id).await?;

        if self.config.require_pairing_for_rating
            && !self
                .requests
                .has_accepted_pairing(rater_id, ratee_id)
                .await
                .map_err(storage)?
        {
            return Err(DomainError::PairingRequired);
        }

        // stars is within 1..=5 here.
        let stored = stars as i32;
        self.ratings
            .upsert(ratee_id, rater_id, stored, Utc::now())
            .await
            .map_err(storage)?;

        let all = self.ratings.stars_for(ratee_id).await.map_err(storage)?;
        let summary = summarize(&all);

        self.events.publish(&SkillExchangeEvent::RatingSubmitted {
            ratee_id,
            rater_id,
            stars,
        });
        info!(
            average = summary.average_rating,
            total = summary.total_reviews,
            "Rating recorded"
        );
        Ok(summary)
    }
}
