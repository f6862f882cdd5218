//! Order API 模块
//!
//! 公共入口：下单、验票（入场口扫码/输码用，不需要管理员身份）。
//! 管理端：订单查询、支付确认、取消。管理员身份通过 handler 的
//! [`CurrentUser`](crate::auth::CurrentUser) extractor 校验。

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Public checkout + redemption
        .route("/", post(handler::create).get(handler::list))
        .route("/verify-token", post(handler::verify_token))
        // Admin
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/validate", put(handler::validate))
        .route("/{id}/cancel", put(handler::cancel))
}
