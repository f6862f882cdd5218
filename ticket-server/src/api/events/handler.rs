//! Event API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Event, EventCreate, EventStatus, EventUpdate};
use crate::db::repository::{self, EventRepository};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_required_text,
};
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

/// GET /api/events - 获取所有活动
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Event>>> {
    let events = EventRepository::new(state.get_db()).find_all().await?;
    Ok(Json(events))
}

/// GET /api/events/:id - 获取单个活动
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Event>> {
    let event_id = repository::record_id("event", &id)
        .map_err(|_| AppError::not_found(format!("Event {} not found", id)))?;
    let event = EventRepository::new(state.get_db())
        .find_by_id(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Event {} not found", id)))?;
    Ok(Json(event))
}

/// POST /api/events - 创建活动 (管理员)
pub async fn create(
    _user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<EventCreate>,
) -> AppResult<(StatusCode, Json<Event>)> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_required_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;
    validate_required_text(&payload.time, "time", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.venue, "venue", MAX_NAME_LEN)?;
    validate_required_text(&payload.city, "city", MAX_NAME_LEN)?;
    validate_required_text(&payload.image, "image", MAX_URL_LEN)?;

    let event = Event {
        id: None,
        title: payload.title,
        description: payload.description,
        date: payload.date,
        time: payload.time,
        venue: payload.venue,
        city: payload.city,
        image: payload.image,
        tickets: payload.tickets,
        status: payload.status.unwrap_or(EventStatus::Upcoming),
        is_archived: false,
        created_at: now_millis(),
    };

    let created = EventRepository::new(state.get_db()).create(event).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/events/:id - 更新活动 (管理员)
pub async fn update(
    _user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<EventUpdate>,
) -> AppResult<Json<Event>> {
    let event_id = repository::record_id("event", &id)
        .map_err(|_| AppError::not_found(format!("Event {} not found", id)))?;

    let repo = EventRepository::new(state.get_db());
    repo.find_by_id(&event_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Event {} not found", id)))?;

    let updated = repo.update(&event_id, payload).await?;
    Ok(Json(updated))
}
