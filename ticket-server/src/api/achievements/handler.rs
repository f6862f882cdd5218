//! Achievement API Handlers
//!
//! 事件衍生成就只由归档任务写入；这里只提供公开读取和管理员
//! 手工添加 (`is_manual = true`)。

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Achievement, AchievementCreate};
use crate::db::repository::AchievementRepository;
use crate::utils::AppResult;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};

/// GET /api/achievements - 成就墙 (公共)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Achievement>>> {
    let achievements = AchievementRepository::new(state.get_db()).find_all().await?;
    Ok(Json(achievements))
}

/// POST /api/achievements - 手工添加成就 (管理员)
pub async fn create(
    _user: CurrentUser,
    State(state): State<ServerState>,
    Json(payload): Json<AchievementCreate>,
) -> AppResult<(StatusCode, Json<Achievement>)> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_DESCRIPTION_LEN)?;

    let achievement = Achievement {
        id: None,
        title: payload.title,
        description: payload.description,
        date: payload.date,
        image: payload.image,
        kind: payload.kind,
        source_event: None,
        is_manual: true,
        created_at: now_millis(),
    };

    let created = AchievementRepository::new(state.get_db())
        .create(achievement)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}
