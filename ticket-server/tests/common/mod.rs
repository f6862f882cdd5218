//! Shared fixtures for the integration suites
#![allow(dead_code)]

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use ticket_server::db::DbService;
use ticket_server::db::models::{Event, EventStatus, OrderDraft, TicketLine, TicketType};
use ticket_server::db::repository::EventRepository;
use ticket_server::notify::NoopNotifier;
use ticket_server::orders::{LifecyclePolicy, OrderLifecycle, RedemptionService};

pub async fn memory_db() -> Surreal<Db> {
    DbService::new_memory()
        .await
        .expect("in-memory db should open")
        .db
}

pub fn engine(db: &Surreal<Db>) -> (OrderLifecycle, RedemptionService) {
    let lifecycle = OrderLifecycle::new(
        db.clone(),
        Arc::new(NoopNotifier),
        LifecyclePolicy::default(),
    );
    let redemption = RedemptionService::new(db.clone());
    (lifecycle, redemption)
}

pub fn sample_event(date: i64) -> Event {
    Event {
        id: None,
        title: "Acoustic Night".to_string(),
        description: "An evening of live music".to_string(),
        date,
        time: "19h30".to_string(),
        venue: "Grand Hall".to_string(),
        city: "Kinshasa".to_string(),
        image: "https://example.com/poster.jpg".to_string(),
        tickets: vec![TicketType {
            ticket_type: "Standard".to_string(),
            price: 20000.0,
            currency: "CDF".to_string(),
            available: 100,
            total: 100,
        }],
        status: EventStatus::Upcoming,
        is_archived: false,
        created_at: 0,
    }
}

pub async fn seed_event(db: &Surreal<Db>, date: i64) -> Event {
    EventRepository::new(db.clone())
        .create(sample_event(date))
        .await
        .expect("event should persist")
}

pub fn sample_draft(event_id: &str) -> OrderDraft {
    OrderDraft {
        event_id: event_id.to_string(),
        customer_name: "Aline M.".to_string(),
        customer_email: Some("aline@example.com".to_string()),
        customer_phone: "+243900000001".to_string(),
        tickets: vec![TicketLine {
            ticket_type: "Standard".to_string(),
            quantity: 1,
            price: 20000.0,
        }],
        total_amount: 20000.0,
        payment_method: "mpesa".to_string(),
    }
}

/// "event:xyz" form of a persisted event's id
pub fn id_string(event: &Event) -> String {
    event.id.as_ref().expect("persisted event has an id").to_string()
}
