//! WAGate Storage - Persistent store for the campaign core
//!
//! Provides the database pool, row models, the `CampaignStore` capability
//! interface, and its sqlx/Postgres implementation.

pub mod db;
pub mod models;
pub mod repository;
pub mod store;

pub use db::DatabasePool;
pub use repository::DbStore;
pub use store::{
    CampaignOps, CampaignStore, CustomerStore, GroupStore, QueueStore, ShortUrlStore,
    TemplateStore,
};
