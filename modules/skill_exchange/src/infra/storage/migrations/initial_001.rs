use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::CanTeach).text().not_null())
                    .col(ColumnDef::new(Users::WantToLearn).text().not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SkillRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SkillRequests::Seq)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SkillRequests::Id)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(SkillRequests::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(SkillRequests::FromId).uuid().not_null())
                    .col(ColumnDef::new(SkillRequests::Skill).string().not_null())
                    .col(ColumnDef::new(SkillRequests::SkillKey).string().not_null())
                    .col(ColumnDef::new(SkillRequests::Role).string_len(16).not_null())
                    .col(ColumnDef::new(SkillRequests::Status).string_len(16).not_null())
                    .col(
                        ColumnDef::new(SkillRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SkillRequests::AcceptedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_skill_requests_owner_status")
                    .table(SkillRequests::Table)
                    .col(SkillRequests::OwnerId)
                    .col(SkillRequests::Status)
                    .to_owned(),
            )
            .await?;

        // At most one pending entry per (owner, sender, skill, role). Partial
        // indexes are spelled the same way in SQLite and Postgres.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_skill_requests_pending \
                 ON skill_requests (owner_id, from_id, skill_key, role) \
                 WHERE status = 'pending'",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Ratings::RateeId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::RaterId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::Stars).integer().not_null())
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Ratings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("ux_ratings_ratee_rater")
                    .table(Ratings::Table)
                    .col(Ratings::RateeId)
                    .col(Ratings::RaterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Messages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Messages::Seq)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Messages::Id).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Messages::SenderId).uuid().not_null())
                    .col(ColumnDef::new(Messages::ReceiverId).uuid().not_null())
                    .col(ColumnDef::new(Messages::Content).text().not_null())
                    .col(
                        ColumnDef::new(Messages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_messages_pair")
                    .table(Messages::Table)
                    .col(Messages::SenderId)
                    .col(Messages::ReceiverId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Messages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SkillRequests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    CanTeach,
    WantToLearn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SkillRequests {
    Table,
    Seq,
    Id,
    OwnerId,
    FromId,
    Skill,
    SkillKey,
    Role,
    Status,
    CreatedAt,
    AcceptedAt,
}

#[derive(DeriveIden)]
enum Ratings {
    Table,
    Id,
    RateeId,
    RaterId,
    Stars,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Messages {
    Table,
    Seq,
    Id,
    SenderId,
    ReceiverId,
    Content,
    CreatedAt,
}
