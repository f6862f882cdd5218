//! Notification Collaborator
//!
//! The order lifecycle calls into this module for its best-effort side
//! effects; delivery is not part of the core and a failure here never
//! fails the triggering operation. Implementations:
//!
//! - [`SmtpNotifier`] - real email via async SMTP
//! - [`NoopNotifier`] - stand-in when SMTP is not configured (and in tests)

mod email;

pub use email::{SmtpConfig, SmtpNotifier};

use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{Event, Order};
use crate::orders::PaymentInstructions;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("message build error: {0}")]
    Message(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Outbound customer/administrator notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Payment instructions to the customer right after checkout
    /// (only called when the customer supplied an email address)
    async fn order_received(
        &self,
        order: &Order,
        event: &Event,
        instructions: &PaymentInstructions,
    ) -> Result<(), NotifyError>;

    /// New-order notice to the administrator
    async fn admin_new_order(&self, order: &Order, event: &Event) -> Result<(), NotifyError>;

    /// The redemption token, once payment is validated
    async fn token_issued(
        &self,
        order: &Order,
        event: &Event,
        token: &str,
    ) -> Result<(), NotifyError>;
}

/// Discards every notification with a debug line. Used when no SMTP
/// configuration is present, and by the test suites.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn order_received(
        &self,
        order: &Order,
        _event: &Event,
        _instructions: &PaymentInstructions,
    ) -> Result<(), NotifyError> {
        tracing::debug!(customer = %order.customer_name, "SMTP not configured, order confirmation skipped");
        Ok(())
    }

    async fn admin_new_order(&self, order: &Order, _event: &Event) -> Result<(), NotifyError> {
        tracing::debug!(customer = %order.customer_name, "SMTP not configured, admin notice skipped");
        Ok(())
    }

    async fn token_issued(
        &self,
        order: &Order,
        _event: &Event,
        _token: &str,
    ) -> Result<(), NotifyError> {
        tracing::debug!(customer = %order.customer_name, "SMTP not configured, token email skipped");
        Ok(())
    }
}
