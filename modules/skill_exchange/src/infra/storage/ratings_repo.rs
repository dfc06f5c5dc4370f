use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::domain::repo::RatingsRepository;
use crate::infra::storage::entity::rating::{ActiveModel as RatingAM, Column, Entity as RatingEntity};

pub struct SeaOrmRatingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRatingsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> RatingsRepository for SeaOrmRatingsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    /// Single `INSERT .. ON CONFLICT (ratee_id, rater_id) DO UPDATE`, so a
    /// repeat rating replaces the earlier one atomically and restarts its
    /// `created_at`.
    async fn upsert(
        &self,
        ratee_id: Uuid,
        rater_id: Uuid,
        stars: i32,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        let m = RatingAM {
            id: Set(Uuid::new_v4()),
            ratee_id: Set(ratee_id),
            rater_id: Set(rater_id),
            stars: Set(stars),
            created_at: Set(at),
            updated_at: Set(at),
        };
        RatingEntity::insert(m)
            .on_conflict(
                OnConflict::columns([Column::RateeId, Column::RaterId])
                    .update_columns([Column::Stars, Column::CreatedAt, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("upsert rating failed")?;
        Ok(())
    }

    async fn stars_for(&self, ratee_id: Uuid) -> anyhow::Result<Vec<i32>> {
        let rows = RatingEntity::find()
            .filter(Column::RateeId.eq(ratee_id))
            .all(&self.conn)
            .await
            .context("stars_for failed")?;
        Ok(rows.into_iter().map(|r| r.stars).collect())
    }
}
