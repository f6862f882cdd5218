//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 管理员登录
//! - [`orders`] - 订单生命周期与令牌兑换
//! - [`events`] - 活动目录
//! - [`achievements`] - 成就墙

use axum::Router;

use crate::core::ServerState;

pub mod achievements;
pub mod auth;
pub mod events;
pub mod health;
pub mod orders;

/// Assemble the full application router
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(orders::router())
        .merge(events::router())
        .merge(achievements::router())
        .with_state(state)
}
