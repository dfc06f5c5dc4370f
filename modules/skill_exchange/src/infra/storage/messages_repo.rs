use anyhow::Context;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::contract::model::Message;
use crate::domain::repo::MessagesRepository;
use crate::infra::storage::entity::message::{
    ActiveModel as MessageAM, Column, Entity as MessageEntity,
};

pub struct SeaOrmMessagesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmMessagesRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> MessagesRepository for SeaOrmMessagesRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, m: Message) -> anyhow::Result<()> {
        let am = MessageAM {
            seq: Default::default(),
            id: Set(m.id),
            sender_id: Set(m.sender_id),
            receiver_id: Set(m.receiver_id),
            content: Set(m.content),
            created_at: Set(m.created_at),
        };
        MessageEntity::insert(am)
            .exec_without_returning(&self.conn)
            .await
            .context("insert message failed")?;
        Ok(())
    }

    async fn conversation(&self, a: Uuid, b: Uuid) -> anyhow::Result<Vec<Message>> {
        let rows = MessageEntity::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(Column::SenderId.eq(a))
                            .add(Column::ReceiverId.eq(b)),
                    )
                    .add(
                        Condition::all()
                            .add(Column::SenderId.eq(b))
                            .add(Column::ReceiverId.eq(a)),
                    ),
            )
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Seq)
            .all(&self.conn)
            .await
            .context("conversation failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
