//! Event Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Event lifecycle status
///
/// The archival job only ever moves this forward to `Past`; it never
/// reverses. `SellingFast` is a display hint set by the administrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Past,
    #[serde(rename = "selling-fast")]
    SellingFast,
}

/// One ticket type definition on an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketType {
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub price: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub available: i64,
    pub total: i64,
}

fn default_currency() -> String {
    "CDF".to_string()
}

/// Event entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub title: String,
    pub description: String,
    /// Scheduled date, Unix millis (UTC)
    pub date: i64,
    /// Door time as displayed, e.g. "19h30"
    pub time: String,
    pub venue: String,
    pub city: String,
    /// Poster image URL (upload/transcoding handled elsewhere)
    pub image: String,
    pub tickets: Vec<TicketType>,
    pub status: EventStatus,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: i64,
}

/// Event for creation (without id)
#[derive(Debug, Clone, Deserialize)]
pub struct EventCreate {
    pub title: String,
    pub description: String,
    pub date: i64,
    pub time: String,
    pub venue: String,
    pub city: String,
    pub image: String,
    #[serde(default)]
    pub tickets: Vec<TicketType>,
    #[serde(default)]
    pub status: Option<EventStatus>,
}

/// Event for update (all optional)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tickets: Option<Vec<TicketType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EventStatus>,
}
