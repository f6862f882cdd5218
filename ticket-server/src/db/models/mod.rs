//! Database Models
//!
//! Serde structs matching the SurrealDB tables.

pub mod achievement;
pub mod event;
pub mod order;
pub mod serde_helpers;

pub use achievement::{Achievement, AchievementCreate, AchievementKind};
pub use event::{Event, EventCreate, EventStatus, EventUpdate, TicketType};
pub use order::{Order, OrderDraft, OrderToken, PaymentMethod, PaymentStatus, TicketLine};
