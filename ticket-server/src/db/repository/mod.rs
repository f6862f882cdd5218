//! Repository Module
//!
//! Provides storage access for SurrealDB tables. Every state-machine
//! mutation is a single conditional SurrealQL statement so the store
//! itself is the source of atomicity truth.

pub mod achievement;
pub mod event;
pub mod order;
pub mod token;

// Re-exports
pub use achievement::AchievementRepository;
pub use event::EventRepository;
pub use order::OrderRepository;
pub use token::TokenRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl RepoError {
    /// True for optimistic-transaction conflicts the engine asks us to
    /// retry (not to be confused with a failed precondition, which
    /// surfaces as an empty result set).
    pub fn is_retriable(&self) -> bool {
        matches!(self, RepoError::Database(msg)
            if msg.contains("can be retried") || msg.contains("write conflict"))
    }
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        if let surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. }) = &err {
            return RepoError::Duplicate(err.to_string());
        }
        let msg = err.to_string();
        // Engine-specific wrapping can hide the typed variant
        if msg.contains("already exists") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::AppError;
        match err {
            RepoError::NotFound(msg) => AppError::not_found(msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "event:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("event", "abc");
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Build a [`RecordId`] from an API path segment, accepting both the
/// bare key ("abc") and the full "table:abc" form.
pub fn record_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if id.contains(':') {
        let parsed: RecordId = id
            .parse()
            .map_err(|_| RepoError::Validation(format!("invalid id: {}", id)))?;
        if parsed.table() != table {
            return Err(RepoError::Validation(format!(
                "id {} does not belong to table {}",
                id, table
            )));
        }
        Ok(parsed)
    } else {
        Ok(RecordId::from_table_key(table, id))
    }
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
