//! Order Lifecycle Engine
//!
//! 持久化状态机的唯一写入方：pending → validated → cancelled 之间的
//! 每一次迁移都通过一条带前置条件的存储层更新完成。通知派发是
//! best-effort 副作用，超时或失败只记录日志，绝不回滚已提交的迁移。

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use surrealdb::RecordId;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

use super::OrderError;
use super::money;
use super::payment::{self, PaymentInstructions};
use super::token::TokenGenerator;
use crate::db::models::{Order, OrderDraft, PaymentMethod, PaymentStatus};
use crate::db::repository::{
    self, EventRepository, OrderRepository, RepoError, TokenRepository,
};
use crate::notify::Notifier;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN};

/// Bound on token generation attempts when the ledger reports
/// collisions, and on validation retries when a concurrent writer keeps
/// moving the order under us.
const MAX_VALIDATE_ATTEMPTS: usize = 5;

/// Policy switches for the engine, all sourced from configuration
#[derive(Debug, Clone)]
pub struct LifecyclePolicy {
    /// Recompute Σ quantity × price and reject a mismatching
    /// `total_amount` at creation. Off by default: the public
    /// contract trusts the client-supplied total.
    pub enforce_total_consistency: bool,
    /// Beneficiary shown in mobile-money payment instructions
    pub payment_recipient: String,
    /// Upper bound for a single notification dispatch
    pub notify_timeout: Duration,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            enforce_total_consistency: false,
            payment_recipient: "Box Office".to_string(),
            notify_timeout: Duration::from_secs(10),
        }
    }
}

/// Order lifecycle engine: exclusive owner of `payment_status`,
/// `token`, `token_used*` and `validated_at` writes.
pub struct OrderLifecycle {
    orders: OrderRepository,
    events: EventRepository,
    tokens: TokenRepository,
    generator: TokenGenerator,
    notifier: Arc<dyn Notifier>,
    policy: LifecyclePolicy,
}

impl OrderLifecycle {
    pub fn new(db: Surreal<Db>, notifier: Arc<dyn Notifier>, policy: LifecyclePolicy) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            events: EventRepository::new(db.clone()),
            tokens: TokenRepository::new(db),
            generator: TokenGenerator::new(),
            notifier,
            policy,
        }
    }

    // ========================================================================
    // Create
    // ========================================================================

    /// Register a purchase attempt in `pending` state and hand back the
    /// payment instructions for the chosen channel.
    pub async fn create(
        &self,
        draft: OrderDraft,
    ) -> Result<(Order, PaymentInstructions), OrderError> {
        let method = check_draft(&draft)?;

        if self.policy.enforce_total_consistency {
            let computed = money::lines_total(&draft.tickets);
            if money::to_decimal(draft.total_amount) != computed {
                return Err(OrderError::Invalid(format!(
                    "total_amount {} does not match ticket lines total {}",
                    draft.total_amount,
                    money::to_f64(computed)
                )));
            }
        }

        let event_id = repository::record_id("event", &draft.event_id)
            .map_err(|_| OrderError::EventNotFound(draft.event_id.clone()))?;
        let event = self
            .events
            .find_by_id(&event_id)
            .await?
            .ok_or_else(|| OrderError::EventNotFound(draft.event_id.clone()))?;

        let order = Order {
            id: None,
            event: event_id,
            customer_name: draft.customer_name,
            customer_email: draft.customer_email,
            customer_phone: draft.customer_phone,
            tickets: draft.tickets,
            total_amount: draft.total_amount,
            payment_method: method,
            payment_status: PaymentStatus::Pending,
            token: None,
            token_used: false,
            token_used_at: None,
            validated_at: None,
            created_at: now_millis(),
        };
        let created = self.orders.create(order).await?;

        let instructions =
            payment::instructions_for(method, &self.policy.payment_recipient, created.total_amount);

        // Best-effort notifications: neither outcome gates the result
        if created.customer_email.is_some() {
            self.dispatch(
                "order confirmation",
                self.notifier.order_received(&created, &event, &instructions),
            )
            .await;
        }
        self.dispatch(
            "admin notification",
            self.notifier.admin_new_order(&created, &event),
        )
        .await;

        Ok((created, instructions))
    }

    // ========================================================================
    // Validate
    // ========================================================================

    /// Confirm payment: mint a token and move the order to `validated`.
    ///
    /// Returns the updated order and whether the token email went out.
    /// The order update is a single conditional statement; the caller
    /// observes either the full transition (status + token + timestamp)
    /// or none of it.
    pub async fn validate(&self, id: &str) -> Result<(Order, bool), OrderError> {
        let order_id = repository::record_id("order", id)
            .map_err(|_| OrderError::OrderNotFound(id.to_string()))?;

        let updated = self.validate_with_fresh_token(&order_id, id).await?;

        // Token email, best-effort; failure is reported, never fatal
        let mut email_sent = false;
        if let (Some(_), Some(token)) = (&updated.customer_email, updated.token.clone()) {
            match self.events.find_by_id(&updated.event).await {
                Ok(Some(event)) => {
                    email_sent = self
                        .dispatch("token email", self.notifier.token_issued(&updated, &event, &token))
                        .await;
                }
                Ok(None) => {
                    tracing::warn!(order = %id, "Event missing, token email skipped");
                }
                Err(e) => {
                    tracing::warn!(order = %id, error = %e, "Event lookup failed, token email skipped");
                }
            }
        }

        Ok((updated, email_sent))
    }

    /// Generate → reserve → conditionally update, retrying on token
    /// collisions and on concurrent state changes.
    async fn validate_with_fresh_token(
        &self,
        order_id: &RecordId,
        id: &str,
    ) -> Result<Order, OrderError> {
        for _attempt in 0..MAX_VALIDATE_ATTEMPTS {
            let token = self.generator.generate()?;
            let now = now_millis();

            match self.tokens.reserve(&token, order_id, now).await {
                Ok(()) => {}
                Err(RepoError::Duplicate(_)) => {
                    tracing::warn!(order = %id, "Token collision, regenerating");
                    continue;
                }
                Err(e) if e.is_retriable() => continue,
                Err(e) => return Err(e.into()),
            }

            match self.orders.mark_validated(order_id, &token, now).await {
                Ok(Some(order)) => return Ok(order),
                Ok(None) => {
                    // Guard refused the update: give the value back,
                    // then find out why.
                    self.release_quietly(&token).await;
                    match self.orders.find_by_id(order_id).await? {
                        None => return Err(OrderError::OrderNotFound(id.to_string())),
                        Some(o) if o.payment_status == PaymentStatus::Validated => {
                            return Err(OrderError::AlreadyValidated);
                        }
                        // A concurrent cancel slipped between our update
                        // and the read; the order is pending/cancelled
                        // again, so another attempt can succeed.
                        Some(_) => continue,
                    }
                }
                Err(e) if e.is_retriable() => {
                    // Optimistic engine conflict; give the value back and retry
                    self.release_quietly(&token).await;
                    continue;
                }
                Err(e) => {
                    self.release_quietly(&token).await;
                    return Err(e.into());
                }
            }
        }

        Err(OrderError::Store(
            "could not validate order: retries exhausted".to_string(),
        ))
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    /// Unconditional reset: any order, in any state, ends up
    /// `cancelled` with token and validation marks cleared.
    pub async fn cancel(&self, id: &str) -> Result<Order, OrderError> {
        let order_id = repository::record_id("order", id)
            .map_err(|_| OrderError::OrderNotFound(id.to_string()))?;

        let existing = self
            .orders
            .find_by_id(&order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))?;

        let updated = self
            .orders
            .cancel_reset(&order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(id.to_string()))?;

        // Free the ledger entry so the value is no longer reserved
        if let Some(token) = existing.token {
            self.release_quietly(&token).await;
        }

        Ok(updated)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn release_quietly(&self, token: &str) {
        if let Err(e) = self.tokens.release(token).await {
            tracing::warn!(error = %e, "Failed to release token reservation");
        }
    }

    /// Await a notification with the configured bound; log the outcome,
    /// swallow the failure. Returns whether the dispatch succeeded.
    async fn dispatch<F>(&self, label: &str, send: F) -> bool
    where
        F: std::future::Future<Output = Result<(), crate::notify::NotifyError>>,
    {
        match tokio::time::timeout(self.policy.notify_timeout, send).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "{} dispatch failed", label);
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.policy.notify_timeout.as_millis() as u64,
                    "{} dispatch timed out",
                    label
                );
                false
            }
        }
    }
}

/// Field checks for the checkout payload; returns the parsed channel.
fn check_draft(draft: &OrderDraft) -> Result<PaymentMethod, OrderError> {
    if draft.customer_name.trim().is_empty() {
        return Err(OrderError::Invalid(
            "customer_name must not be empty".to_string(),
        ));
    }
    if draft.customer_name.len() > MAX_NAME_LEN {
        return Err(OrderError::Invalid("customer_name is too long".to_string()));
    }
    if draft.customer_phone.trim().is_empty() {
        return Err(OrderError::Invalid(
            "customer_phone must not be empty".to_string(),
        ));
    }
    if draft.customer_phone.len() > MAX_SHORT_TEXT_LEN {
        return Err(OrderError::Invalid("customer_phone is too long".to_string()));
    }
    if let Some(email) = &draft.customer_email
        && email.len() > MAX_EMAIL_LEN
    {
        return Err(OrderError::Invalid("customer_email is too long".to_string()));
    }
    if draft.tickets.is_empty() {
        return Err(OrderError::Invalid(
            "order must contain at least one ticket line".to_string(),
        ));
    }
    for line in &draft.tickets {
        if line.quantity == 0 {
            return Err(OrderError::Invalid(format!(
                "ticket '{}' quantity must be at least 1",
                line.ticket_type
            )));
        }
        if line.price < 0.0 {
            return Err(OrderError::Invalid(format!(
                "ticket '{}' price must not be negative",
                line.ticket_type
            )));
        }
    }
    if draft.total_amount < 0.0 {
        return Err(OrderError::Invalid(
            "total_amount must not be negative".to_string(),
        ));
    }

    PaymentMethod::from_str(&draft.payment_method).map_err(OrderError::Invalid)
}
