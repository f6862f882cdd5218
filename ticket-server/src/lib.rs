//! Ticket Server - 现场活动票务销售后端
//!
//! # 架构概述
//!
//! 顾客下单后通过移动支付线下付款，管理员核实到账并确认订单，
//! 系统签发一次性兑换令牌用于入场验票；到期活动由归档任务
//! 转为历史记录。
//!
//! # 模块结构
//!
//! ```text
//! ticket-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器、后台任务
//! ├── auth/          # 管理员 JWT 认证
//! ├── api/           # HTTP 路由和处理器
//! ├── orders/        # 订单状态机、令牌生成与兑换
//! ├── archival/      # 活动归档调度器
//! ├── notify/        # 通知派发 (SMTP / noop)
//! ├── db/            # 数据库层 (嵌入式 SurrealDB)
//! └── utils/         # 错误、日志、验证、时间工具
//! ```

pub mod api;
pub mod archival;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod orders;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use orders::{OrderError, OrderLifecycle, RedemptionService, TokenGenerator};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
   ______ _       __        __
  /_  __/(_)____ / /__ ___  / /_
   / /  / // ___/ //_// _ \/ __/
  / /  / // /__/ ,<  /  __/ /_
 /_/  /_/ \___/_/|_| \___/\__/
    _____
   / ___/ ___   _____ _   __ ___   _____
   \__ \ / _ \ / ___/| | / // _ \ / ___/
  ___/ //  __// /    | |/ //  __// /
 /____/ \___//_/     |___/ \___//_/
    "#
    );
}
