//! Local persistence for the two mirrored entity kinds.
//!
//! # Database
//!
//! ## Tables
//!
//! - `mail_chimp_lists` - local copy of mailing lists (structured blocks
//!   as JSONB, nullable `mail_chimp_id`)
//! - `mail_chimp_members` - local copy of list members, keyed by list
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded with
//! `sqlx::migrate!`; the server runs them at startup.
//!
//! # Trait seams
//!
//! The sync services depend on [`ListStore`] and [`MemberStore`] rather
//! than concrete repositories, so the dual-write pipelines can be tested
//! against [`memory::MemoryStore`] without a live database.

pub mod lists;
pub mod members;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use mailmirror_core::{ListId, MemberId};

use crate::models::{List, Member};

pub use lists::PgListStore;
pub use members::PgMemberStore;
pub use memory::MemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Persistence operations for lists.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Insert a new list row.
    async fn insert(&self, list: &List) -> Result<(), RepositoryError>;

    /// Persist the current state of an existing list (also how a
    /// `mail_chimp_id` assignment is stored).
    async fn update(&self, list: &List) -> Result<(), RepositoryError>;

    /// Remove a list row.
    async fn remove(&self, id: ListId) -> Result<(), RepositoryError>;

    /// Fetch one list by local id.
    async fn find(&self, id: ListId) -> Result<Option<List>, RepositoryError>;

    /// Fetch every list.
    async fn all(&self) -> Result<Vec<List>, RepositoryError>;
}

/// Persistence operations for members.
#[async_trait]
pub trait MemberStore: Send + Sync {
    /// Insert a new member row.
    async fn insert(&self, member: &Member) -> Result<(), RepositoryError>;

    /// Persist the current state of an existing member.
    async fn update(&self, member: &Member) -> Result<(), RepositoryError>;

    /// Remove a member row.
    async fn remove(&self, id: MemberId) -> Result<(), RepositoryError>;

    /// Fetch one member by local id, scoped to its list.
    async fn find_in_list(
        &self,
        list_id: ListId,
        id: MemberId,
    ) -> Result<Option<Member>, RepositoryError>;

    /// Fetch every member of a list.
    async fn find_by_list(&self, list_id: ListId) -> Result<Vec<Member>, RepositoryError>;

    /// Fetch members matching `(list_id, email_address)` exactly.
    ///
    /// The duplicate-guard query: compares the stored form of the address
    /// as given, with no normalization.
    async fn find_by_email(
        &self,
        list_id: ListId,
        email_address: &str,
    ) -> Result<Vec<Member>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
