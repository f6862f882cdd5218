//! Order Repository
//!
//! 订单表访问层。状态机的每一次变更都是一条带前置条件的
//! SurrealQL UPDATE（条件不满足时返回空结果），因此并发调用
//! 由存储层按记录串行化，应用层不持锁。

use super::{BaseRepository, RepoResult};
use crate::db::models::{Order, PaymentStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist a new order (id assigned by the store)
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| super::RepoError::Database("Failed to create order".to_string()))
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// Find the order currently holding a token value
    pub async fn find_by_token(&self, token: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE token = $token LIMIT 1")
            .bind(("token", token.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// List orders, newest first, optionally filtered by payment status
    /// and/or event
    pub async fn find_all(
        &self,
        status: Option<PaymentStatus>,
        event: Option<RecordId>,
    ) -> RepoResult<Vec<Order>> {
        let mut sql = String::from("SELECT * FROM order");
        let mut clauses: Vec<&str> = Vec::new();
        if status.is_some() {
            clauses.push("payment_status = $status");
        }
        if event.is_some() {
            clauses.push("event = $event");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query = self.base.db().query(sql);
        if let Some(s) = status {
            query = query.bind(("status", s.as_str().to_string()));
        }
        if let Some(e) = event {
            // The link is persisted in its "table:id" string form
            query = query.bind(("event", e.to_string()));
        }

        let orders: Vec<Order> = query.await?.take(0)?;
        Ok(orders)
    }

    /// Transition to `validated`, attaching the token.
    ///
    /// Status, token and timestamp move together in one conditional
    /// statement; an already-validated order leaves the statement
    /// without effect and `None` is returned. Cancelled orders pass
    /// the guard (re-validation is allowed).
    pub async fn mark_validated(
        &self,
        id: &RecordId,
        token: &str,
        now: i64,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE $order SET
                    payment_status = 'validated',
                    token = $token,
                    validated_at = $now,
                    token_used = false,
                    token_used_at = NONE
                WHERE payment_status != 'validated'
                RETURN AFTER
                "#,
            )
            .bind(("order", id.clone()))
            .bind(("token", token.to_string()))
            .bind(("now", now))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Unconditional reset to `cancelled`: clears token, usage marks
    /// and validation timestamp regardless of prior state.
    pub async fn cancel_reset(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE $order SET
                    payment_status = 'cancelled',
                    token = NONE,
                    token_used = false,
                    token_used_at = NONE,
                    validated_at = NONE
                RETURN AFTER
                "#,
            )
            .bind(("order", id.clone()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Exactly-once redemption: compare-and-set on `token_used`.
    ///
    /// Under concurrent calls with the same token the store serializes
    /// the update; exactly one caller gets the record back, the rest
    /// get an empty result and must re-read to classify the failure.
    pub async fn redeem(&self, token: &str, now: i64) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                r#"
                UPDATE order SET
                    token_used = true,
                    token_used_at = $now
                WHERE token = $token
                    AND payment_status = 'validated'
                    AND token_used = false
                RETURN AFTER
                "#,
            )
            .bind(("token", token.to_string()))
            .bind(("now", now))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }
}
