//! Token Redemption Service
//!
//! 全系统的核心正确性属性：一张票绝不能入场两次。
//! 兑换是存储层的一次 compare-and-set（`token_used: false → true`），
//! 并发调用时恰好一个成功，其余观察到 AlreadyUsed。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::OrderError;
use crate::db::models::{Event, Order, PaymentStatus};
use crate::db::repository::{EventRepository, OrderRepository};
use crate::utils::time::now_millis;

/// CAS attempts before giving up on a token whose state keeps shifting
/// under us (engine-level write conflicts, or a token revoked and
/// re-validated mid-flight).
const MAX_CAS_ATTEMPTS: usize = 8;

/// Looks up orders by token and performs the exactly-once redemption
/// check. Reads the event alongside so the door staff sees what the
/// ticket is for.
pub struct RedemptionService {
    orders: OrderRepository,
    events: EventRepository,
}

impl RedemptionService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            events: EventRepository::new(db),
        }
    }

    /// Consume a token. Exactly one concurrent caller can succeed; the
    /// preconditions are re-checked at the store, not assumed from any
    /// earlier read.
    pub async fn redeem(&self, token: &str) -> Result<(Order, Option<Event>), OrderError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(OrderError::Invalid("token is required".to_string()));
        }

        for _ in 0..MAX_CAS_ATTEMPTS {
            let attempt = match self.orders.redeem(token, now_millis()).await {
                Ok(attempt) => attempt,
                // Optimistic engine detected concurrent writers; re-run
                Err(e) if e.is_retriable() => continue,
                Err(e) => return Err(e.into()),
            };
            if let Some(order) = attempt {
                // The redemption is committed; event lookup is display
                // data and must not undo it.
                let event = match self.events.find_by_id(&order.event).await {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::warn!(error = %e, "Event lookup failed after redemption");
                        None
                    }
                };
                return Ok((order, event));
            }

            // CAS refused: classify against the current state
            match self.orders.find_by_token(token).await? {
                None => return Err(OrderError::TokenNotFound),
                Some(order) if order.payment_status != PaymentStatus::Validated => {
                    return Err(OrderError::NotValidated);
                }
                Some(order) if order.token_used => return Err(OrderError::TokenAlreadyUsed),
                // Looks redeemable again: a concurrent writer moved the
                // order between our CAS and this read. Try the CAS again.
                Some(_) => continue,
            }
        }

        Err(OrderError::Store(
            "redemption retries exhausted under contention".to_string(),
        ))
    }
}
