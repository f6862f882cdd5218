//! SMTP email notifier using Lettre.
//!
//! A new transport is not built per message; the async SMTP transport
//! keeps its own connection pool.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{Notifier, NotifyError};
use crate::db::models::{Event, Order};
use crate::orders::PaymentInstructions;

/// SMTP connection settings, normally sourced from the environment
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender, e.g. `"Box Office <no-reply@example.com>"`
    pub from: String,
    /// Recipient of new-order notices; notices are skipped when unset
    pub admin_email: Option<String>,
}

/// Email notifier over async SMTP (STARTTLS relay)
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    admin_email: Option<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|_| NotifyError::Address(format!("invalid sender: {}", config.from)))?;

        let admin_email = match &config.admin_email {
            Some(addr) => Some(
                addr.parse()
                    .map_err(|_| NotifyError::Address(format!("invalid admin email: {addr}")))?,
            ),
            None => None,
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
            .map_err(|e| NotifyError::Transport(format!("SMTP relay error: {e}")))?
            .port(config.port)
            .credentials(Credentials::new(config.username, config.password))
            .build();

        Ok(Self {
            transport,
            from,
            admin_email,
        })
    }

    async fn send(&self, to: Mailbox, subject: &str, html: String) -> Result<(), NotifyError> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotifyError::Message(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Transport(e.to_string()))
    }

    fn customer_mailbox(&self, order: &Order) -> Result<Mailbox, NotifyError> {
        let email = order
            .customer_email
            .as_deref()
            .ok_or_else(|| NotifyError::Address("order has no customer email".to_string()))?;
        email
            .parse()
            .map_err(|_| NotifyError::Address(format!("invalid customer email: {email}")))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn order_received(
        &self,
        order: &Order,
        event: &Event,
        instructions: &PaymentInstructions,
    ) -> Result<(), NotifyError> {
        let to = self.customer_mailbox(order)?;
        let html = order_received_body(order, event, instructions);
        self.send(to, "Your ticket order", html).await?;
        tracing::info!(customer = %order.customer_name, "Order confirmation sent");
        Ok(())
    }

    async fn admin_new_order(&self, order: &Order, event: &Event) -> Result<(), NotifyError> {
        let Some(admin) = self.admin_email.clone() else {
            tracing::debug!("ADMIN_NOTIFY_EMAIL not set, admin notice skipped");
            return Ok(());
        };
        let html = admin_new_order_body(order, event);
        self.send(admin, "New ticket order", html).await?;
        Ok(())
    }

    async fn token_issued(
        &self,
        order: &Order,
        event: &Event,
        token: &str,
    ) -> Result<(), NotifyError> {
        let to = self.customer_mailbox(order)?;
        let html = token_issued_body(order, event, token);
        self.send(to, "Your e-ticket", html).await?;
        tracing::info!(customer = %order.customer_name, "Token email sent");
        Ok(())
    }
}

// ============================================================================
// Templates: deliberately small; delivery is a collaborator, not core
// ============================================================================

fn order_received_body(
    order: &Order,
    event: &Event,
    instructions: &PaymentInstructions,
) -> String {
    format!(
        "<h2>Thank you for your order, {name}!</h2>\
         <p>Your order for <strong>{title}</strong> ({venue}, {city}) has been recorded.</p>\
         <p>To complete the purchase, pay <strong>{amount} {currency}</strong> by mobile money:</p>\
         <ol>\
         <li>Dial {ussd}</li>\
         <li>{steps}</li>\
         <li>Beneficiary: <strong>{recipient}</strong></li>\
         </ol>\
         <p>You will receive your e-ticket once the payment is confirmed.</p>",
        name = order.customer_name,
        title = event.title,
        venue = event.venue,
        city = event.city,
        amount = instructions.amount,
        currency = instructions.currency,
        ussd = instructions.ussd,
        steps = instructions.steps,
        recipient = instructions.recipient,
    )
}

fn admin_new_order_body(order: &Order, event: &Event) -> String {
    let id = order
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    format!(
        "<h3>New order</h3>\
         <p>Reference: {id}</p>\
         <p>Event: {title}</p>\
         <p>Customer: {name} ({phone})</p>\
         <p>Amount: {amount} CDF via {method}</p>",
        title = event.title,
        name = order.customer_name,
        phone = order.customer_phone,
        amount = order.total_amount,
        method = order.payment_method,
    )
}

fn token_issued_body(order: &Order, event: &Event, token: &str) -> String {
    format!(
        "<h2>Payment confirmed</h2>\
         <p>{name}, here is your access token for <strong>{title}</strong>:</p>\
         <p style=\"font-size:24px;letter-spacing:2px\"><strong>{token}</strong></p>\
         <p>{venue}, {city} — present this token at the entrance. It can be used once.</p>",
        name = order.customer_name,
        title = event.title,
        venue = event.venue,
        city = event.city,
    )
}
