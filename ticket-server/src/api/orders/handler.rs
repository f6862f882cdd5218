//! Order API Handlers

use std::str::FromStr;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Event, Order, OrderDraft, PaymentStatus};
use crate::db::repository::{self, OrderRepository};
use crate::orders::PaymentInstructions;
use crate::utils::{AppError, AppResult};

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub payment_instructions: PaymentInstructions,
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub order: Order,
    /// Whether the token email actually went out (best-effort; a false
    /// here never rolls the validation back)
    pub token_email_sent: bool,
}

#[derive(Debug, Deserialize)]
pub struct VerifyTokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    pub order: Order,
    pub event: Option<Event>,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<String>,
    pub event_id: Option<String>,
}

/// POST /api/orders - 创建订单 (公共)
pub async fn create(
    State(state): State<ServerState>,
    Json(draft): Json<OrderDraft>,
) -> AppResult<(StatusCode, Json<CreateOrderResponse>)> {
    let (order, payment_instructions) = state.lifecycle.create(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order,
            payment_instructions,
        }),
    ))
}

/// GET /api/orders - 订单列表，可按状态/活动过滤 (管理员)
pub async fn list(
    _user: CurrentUser,
    State(state): State<ServerState>,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let status = match &query.status {
        Some(s) => Some(PaymentStatus::from_str(s).map_err(AppError::validation)?),
        None => None,
    };
    let event = match &query.event_id {
        Some(id) => Some(
            repository::record_id("event", id)
                .map_err(|_| AppError::validation(format!("invalid event id: {id}")))?,
        ),
        None => None,
    };

    let orders = OrderRepository::new(state.get_db())
        .find_all(status, event)
        .await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 获取单个订单 (管理员)
pub async fn get_by_id(
    _user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order_id = repository::record_id("order", &id)
        .map_err(|_| AppError::not_found(format!("Order {} not found", id)))?;
    let order = OrderRepository::new(state.get_db())
        .find_by_id(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found", id)))?;
    Ok(Json(order))
}

/// PUT /api/orders/:id/validate - 确认支付并签发令牌 (管理员)
pub async fn validate(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ValidateResponse>> {
    let (order, token_email_sent) = state.lifecycle.validate(&id).await?;
    tracing::info!(order = %id, admin = %user.username, "Payment validated");
    Ok(Json(ValidateResponse {
        order,
        token_email_sent,
    }))
}

/// PUT /api/orders/:id/cancel - 取消订单并撤销令牌 (管理员)
pub async fn cancel(
    user: CurrentUser,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = state.lifecycle.cancel(&id).await?;
    tracing::info!(order = %id, admin = %user.username, "Order cancelled");
    Ok(Json(order))
}

/// POST /api/orders/verify-token - 验票 (公共兑换入口)
pub async fn verify_token(
    State(state): State<ServerState>,
    Json(req): Json<VerifyTokenRequest>,
) -> AppResult<Json<VerifyTokenResponse>> {
    let (order, event) = state.redemption.redeem(&req.token).await?;
    Ok(Json(VerifyTokenResponse { order, event }))
}
