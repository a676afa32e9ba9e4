//! Repository layer - sqlx implementation of the store traits

pub mod campaigns;
pub mod customers;
pub mod groups;
pub mod queue;
pub mod short_urls;
pub mod templates;

use sqlx::PgPool;
use wagate_common::Error;

use crate::db::DatabasePool;

/// Database-backed implementation of [`crate::store::CampaignStore`].
///
/// The trait impls are spread across the entity modules in this
/// directory; they all operate on the same pool.
#[derive(Clone)]
pub struct DbStore {
    pool: PgPool,
}

impl DbStore {
    pub fn new(db: &DatabasePool) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a sqlx error to the common error type, distinguishing unique
/// violations so callers can react to conflicts
pub(crate) fn map_db_err(e: sqlx::Error) -> Error {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return Error::Conflict(db_err.to_string());
        }
    }
    Error::Database(e.to_string())
}
