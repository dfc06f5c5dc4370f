//! SeaORM-backed users repository.
//!
//! Generic over `C: ConnectionTrait`, so it works with a `DatabaseConnection`
//! or a transaction.

use anyhow::Context;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::contract::model::User;
use crate::domain::repo::UsersRepository;
use crate::infra::storage::classify_write_error;
use crate::infra::storage::entity::user::{ActiveModel as UserAM, Column, Entity as UserEntity};

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn active_model(u: User) -> UserAM {
    UserAM {
        id: Set(u.id),
        name: Set(u.name),
        email: Set(u.email),
        can_teach: Set(u.can_teach),
        want_to_learn: Set(u.want_to_learn),
        created_at: Set(u.created_at),
        updated_at: Set(u.updated_at),
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_many(&self, ids: &[Uuid]) -> anyhow::Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = UserEntity::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn)
            .await
            .context("find_many failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, u: User) -> anyhow::Result<()> {
        active_model(u)
            .insert(&self.conn)
            .await
            .map_err(|e| classify_write_error(e, "insert user failed"))?;
        Ok(())
    }

    async fn update(&self, u: User) -> anyhow::Result<()> {
        active_model(u)
            .update(&self.conn)
            .await
            .map_err(|e| classify_write_error(e, "update user failed"))?;
        Ok(())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Email)
            .all(&self.conn)
            .await
            .context("list_all failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
