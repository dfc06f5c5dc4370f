pub mod entity;
pub mod messages_repo;
pub mod migrations;
pub mod ratings_repo;
pub mod requests_repo;
pub mod users_repo;

pub use messages_repo::SeaOrmMessagesRepository;
pub use ratings_repo::SeaOrmRatingsRepository;
pub use requests_repo::SeaOrmRequestsRepository;
pub use users_repo::SeaOrmUsersRepository;

use sea_orm::{DbErr, SqlErr};

use crate::domain::repo::UniqueViolation;

/// Surfaces unique-constraint failures as [`UniqueViolation`] so the service
/// can tell them apart from other storage errors.
pub(crate) fn classify_write_error(err: DbErr, context: &'static str) -> anyhow::Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(constraint)) => {
            anyhow::Error::new(UniqueViolation { constraint })
        }
        _ => anyhow::Error::new(err).context(context),
    }
}
