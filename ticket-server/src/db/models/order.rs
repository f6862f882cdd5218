//! Order Model
//!
//! 订单是票务销售的核心实体，带有支付状态机：
//! pending → validated → (token redeemed)；pending/validated → cancelled。
//! `token` 只在 validated 状态下存在，取消时清除。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use surrealdb::RecordId;

/// Mobile-money payment channels accepted at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Mpesa,
    Orange,
    Airtel,
    Africell,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Orange => "orange",
            PaymentMethod::Airtel => "airtel",
            PaymentMethod::Africell => "africell",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "orange" => Ok(PaymentMethod::Orange),
            "airtel" => Ok(PaymentMethod::Airtel),
            "africell" => Ok(PaymentMethod::Africell),
            other => Err(format!("unknown payment method: {}", other)),
        }
    }
}

/// Payment state machine discriminant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Validated,
    Cancelled,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Validated => "validated",
            PaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "validated" => Ok(PaymentStatus::Validated),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            other => Err(format!("unknown payment status: {}", other)),
        }
    }
}

/// One ticket line on an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLine {
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub quantity: u32,
    pub price: f64,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub event: RecordId,
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub tickets: Vec<TicketLine>,
    pub total_amount: f64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default)]
    pub token_used: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_used_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validated_at: Option<i64>,
    pub created_at: i64,
}

/// Incoming order payload (public checkout form)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDraft {
    pub event_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub customer_phone: String,
    pub tickets: Vec<TicketLine>,
    pub total_amount: f64,
    /// Parsed by the lifecycle engine so an unknown channel is a
    /// validation error, not a deserialization failure
    pub payment_method: String,
}

/// Token ledger row. The record id IS the token value, which makes
/// the storage layer the uniqueness constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderToken {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    #[serde(with = "serde_helpers::record_id")]
    pub order: RecordId,
    pub created_at: i64,
}
