//! 订单域 - 支付状态机与兑换协议
//!
//! # 模块结构
//!
//! - [`token`] - 兑换令牌生成器
//! - [`lifecycle`] - 订单生命周期引擎 (create / validate / cancel)
//! - [`redemption`] - 令牌兑换服务 (exactly-once)
//! - [`payment`] - 移动支付渠道说明
//! - [`money`] - 金额精度辅助

pub mod lifecycle;
pub mod money;
pub mod payment;
pub mod redemption;
pub mod token;

pub use lifecycle::{LifecyclePolicy, OrderLifecycle};
pub use payment::PaymentInstructions;
pub use redemption::RedemptionService;
pub use token::TokenGenerator;

use crate::db::repository::RepoError;
use crate::utils::AppError;
use thiserror::Error;

/// Typed outcomes of the order state machine.
///
/// Every failure names the precondition that was violated; the HTTP
/// layer maps each variant without collapsing categories.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order {0} not found")]
    OrderNotFound(String),

    #[error("Event {0} not found")]
    EventNotFound(String),

    #[error("Order already validated")]
    AlreadyValidated,

    #[error("Unknown token")]
    TokenNotFound,

    #[error("Payment not validated")]
    NotValidated,

    #[error("Token already used")]
    TokenAlreadyUsed,

    #[error("{0}")]
    Invalid(String),

    #[error("Storage failure: {0}")]
    Store(String),
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(msg) => OrderError::Invalid(msg),
            other => OrderError::Store(other.to_string()),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match &err {
            OrderError::OrderNotFound(_)
            | OrderError::EventNotFound(_)
            | OrderError::TokenNotFound => AppError::not_found(err.to_string()),
            OrderError::AlreadyValidated
            | OrderError::NotValidated
            | OrderError::TokenAlreadyUsed => AppError::business_rule(err.to_string()),
            OrderError::Invalid(msg) => AppError::validation(msg.clone()),
            OrderError::Store(msg) => AppError::database(msg.clone()),
        }
    }
}
