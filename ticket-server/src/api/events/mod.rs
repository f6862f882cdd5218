//! Event API 模块
//!
//! 读操作公开；创建/更新由 handler 内的
//! [`CurrentUser`](crate::auth::CurrentUser) extractor 限定为管理员。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/events", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
}
