//! Token Ledger Repository
//!
//! The `order_token` table uses the token value itself as record id, so a
//! duplicate reservation fails at the storage layer with
//! [`RepoError::Duplicate`](super::RepoError::Duplicate). Generation
//! collisions therefore cannot hand the same token to two orders, no
//! matter how the generator behaves.

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::OrderToken;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order_token";

#[derive(Clone)]
pub struct TokenRepository {
    base: BaseRepository,
}

impl TokenRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Reserve a token value for an order.
    ///
    /// Fails with [`RepoError::Duplicate`] if the value is already
    /// reserved; callers regenerate and retry.
    pub async fn reserve(&self, token: &str, order: &RecordId, now: i64) -> RepoResult<()> {
        let row = OrderToken {
            id: None,
            order: order.clone(),
            created_at: now,
        };
        let created: Option<OrderToken> = self
            .base
            .db()
            .create((TABLE, token))
            .content(row)
            .await?;
        created
            .map(|_| ())
            .ok_or_else(|| RepoError::Database("Failed to reserve token".to_string()))
    }

    /// Release a reservation (used when validation loses its race, and
    /// on cancellation).
    pub async fn release(&self, token: &str) -> RepoResult<()> {
        let _deleted: Option<OrderToken> = self.base.db().delete((TABLE, token)).await?;
        Ok(())
    }
}
