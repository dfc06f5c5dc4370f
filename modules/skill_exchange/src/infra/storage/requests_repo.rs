//! SeaORM-backed request inbox.
//!
//! Multi-step operations run inside a transaction opened from `C`; every
//! statement in them uses the transaction handle, never `self.conn`.

use anyhow::Context;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Select, TransactionTrait,
};
use uuid::Uuid;

use crate::contract::model::{RequestStatus, SkillRequest};
use crate::domain::repo::{AcceptOutcome, RequestsRepository, SendOutcome, UniqueViolation};
use crate::domain::request::{mirror_of, skill_key};
use crate::infra::storage::entity::skill_request::{
    new_active_model, Column, Entity as RequestEntity, Model,
};
use crate::infra::storage::entity::user::Entity as UserEntity;
use crate::infra::storage::classify_write_error;

pub struct SeaOrmRequestsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmRequestsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

fn to_domain(rows: Vec<Model>) -> anyhow::Result<Vec<SkillRequest>> {
    rows.into_iter().map(SkillRequest::try_from).collect()
}

/// Accepted entries in `owner`'s list matching the exchange shape.
fn accepted_like(owner: Uuid, from: Uuid, skill_key: &str, role: &str) -> Select<RequestEntity> {
    RequestEntity::find()
        .filter(Column::OwnerId.eq(owner))
        .filter(Column::FromId.eq(from))
        .filter(Column::SkillKey.eq(skill_key))
        .filter(Column::Role.eq(role))
        .filter(Column::Status.eq(RequestStatus::Accepted.as_str()))
        .order_by_asc(Column::Seq)
}

#[async_trait::async_trait]
impl<C> RequestsRepository for SeaOrmRequestsRepository<C>
where
    C: ConnectionTrait + TransactionTrait + Send + Sync + 'static,
{
    async fn insert_pending_if_absent(&self, req: SkillRequest) -> anyhow::Result<SendOutcome> {
        let txn = self.conn.begin().await.context("begin failed")?;

        let existing = RequestEntity::find()
            .filter(Column::OwnerId.eq(req.owner_id))
            .filter(Column::FromId.eq(req.from_id))
            .filter(Column::SkillKey.eq(skill_key(&req.skill)))
            .filter(Column::Role.eq(req.role.as_str()))
            .all(&txn)
            .await
            .context("duplicate lookup failed")?;

        let has = |status: RequestStatus| existing.iter().any(|m| m.status == status.as_str());
        let outcome = if has(RequestStatus::Pending) {
            Some(SendOutcome::DuplicatePending)
        } else if has(RequestStatus::Accepted) {
            Some(SendOutcome::AlreadyAccepted)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            txn.rollback().await.context("rollback failed")?;
            return Ok(outcome);
        }

        // A concurrent send can slip past the lookup; the partial unique
        // index on pending entries catches it here.
        if let Err(err) = RequestEntity::insert(new_active_model(&req))
            .exec_without_returning(&txn)
            .await
        {
            let err = classify_write_error(err, "insert request failed");
            txn.rollback().await.context("rollback failed")?;
            return if err.is::<UniqueViolation>() {
                Ok(SendOutcome::DuplicatePending)
            } else {
                Err(err)
            };
        }
        txn.commit().await.context("commit failed")?;
        Ok(SendOutcome::Inserted)
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
        status: RequestStatus,
    ) -> anyhow::Result<Vec<SkillRequest>> {
        let mut query = RequestEntity::find()
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Status.eq(status.as_str()));
        if status == RequestStatus::Accepted {
            query = query.order_by_asc(Column::AcceptedAt);
        }
        let rows = query
            .order_by_asc(Column::Seq)
            .all(&self.conn)
            .await
            .context("list_for_owner failed")?;
        to_domain(rows)
    }

    async fn list_all_pending(&self) -> anyhow::Result<Vec<SkillRequest>> {
        let rows = RequestEntity::find()
            .filter(Column::Status.eq(RequestStatus::Pending.as_str()))
            .order_by_asc(Column::Seq)
            .all(&self.conn)
            .await
            .context("list_all_pending failed")?;
        to_domain(rows)
    }

    async fn accept_and_mirror(
        &self,
        owner_id: Uuid,
        request_id: Uuid,
        accepted_at: DateTime<Utc>,
    ) -> anyhow::Result<AcceptOutcome> {
        let txn = self.conn.begin().await.context("begin failed")?;

        let Some(row) = RequestEntity::find()
            .filter(Column::Id.eq(request_id))
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Status.eq(RequestStatus::Pending.as_str()))
            .one(&txn)
            .await
            .context("pending lookup failed")?
        else {
            txn.rollback().await.context("rollback failed")?;
            return Ok(AcceptOutcome::NotFound);
        };

        let sender_id = row.from_id;
        let sender_exists = UserEntity::find_by_id(sender_id)
            .one(&txn)
            .await
            .context("sender lookup failed")?
            .is_some();
        if !sender_exists {
            txn.rollback().await.context("rollback failed")?;
            return Ok(AcceptOutcome::CounterpartMissing { sender_id });
        }

        // Crossed requests: the owner may already hold this exchange as the
        // mirror of an earlier accept. The pending entry is then folded into it.
        let held = accepted_like(row.owner_id, row.from_id, &row.skill_key, &row.role)
            .one(&txn)
            .await
            .context("accepted lookup failed")?;

        // Both branches are conditional on the entry still being pending, so
        // concurrent accepts of the same entry cannot both mirror.
        let still_pending = Condition::all()
            .add(Column::Seq.eq(row.seq))
            .add(Column::Status.eq(RequestStatus::Pending.as_str()));
        let (touched, accepted) = match held {
            Some(existing) => {
                let res = RequestEntity::delete_many()
                    .filter(still_pending)
                    .exec(&txn)
                    .await
                    .context("pending merge failed")?;
                (res.rows_affected, existing)
            }
            None => {
                let res = RequestEntity::update_many()
                    .col_expr(
                        Column::Status,
                        Expr::value(RequestStatus::Accepted.as_str()),
                    )
                    .col_expr(Column::AcceptedAt, Expr::value(accepted_at))
                    .filter(still_pending)
                    .exec(&txn)
                    .await
                    .context("accept update failed")?;
                let accepted = Model {
                    status: RequestStatus::Accepted.as_str().to_owned(),
                    accepted_at: Some(accepted_at),
                    ..row
                };
                (res.rows_affected, accepted)
            }
        };
        if touched == 0 {
            txn.rollback().await.context("rollback failed")?;
            return Ok(AcceptOutcome::NotFound);
        }
        let accepted = SkillRequest::try_from(accepted)?;

        let mirror = mirror_of(&accepted, accepted_at);
        let sender_has_it = accepted_like(
            mirror.owner_id,
            mirror.from_id,
            &skill_key(&mirror.skill),
            mirror.role.as_str(),
        )
        .count(&txn)
        .await
        .context("mirror lookup failed")?
            > 0;
        if sender_has_it {
            txn.commit().await.context("commit failed")?;
            return Ok(AcceptOutcome::Accepted {
                accepted,
                mirror: None,
            });
        }

        RequestEntity::insert(new_active_model(&mirror))
            .exec_without_returning(&txn)
            .await
            .context("mirror insert failed")?;
        txn.commit().await.context("commit failed")?;

        Ok(AcceptOutcome::Accepted {
            accepted,
            mirror: Some(mirror),
        })
    }

    async fn delete_for_owner(
        &self,
        owner_id: Uuid,
        request_id: Uuid,
        status: RequestStatus,
    ) -> anyhow::Result<bool> {
        let res = RequestEntity::delete_many()
            .filter(Column::Id.eq(request_id))
            .filter(Column::OwnerId.eq(owner_id))
            .filter(Column::Status.eq(status.as_str()))
            .exec(&self.conn)
            .await
            .context("delete_for_owner failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn has_accepted_pairing(&self, a: Uuid, b: Uuid) -> anyhow::Result<bool> {
        let count = RequestEntity::find()
            .filter(Column::Status.eq(RequestStatus::Accepted.as_str()))
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(Column::OwnerId.eq(a))
                            .add(Column::FromId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(Column::OwnerId.eq(b))
                            .add(Column::FromId.eq(a)),
                    ),
            )
            .count(&self.conn)
            .await
            .context("has_accepted_pairing failed")?;
        Ok(count > 0)
    }
}
