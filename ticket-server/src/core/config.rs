use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::notify::SmtpConfig;

/// 服务器配置 - 所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 5000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别 |
/// | ADMIN_USERNAME | admin | 管理员用户名 |
/// | ADMIN_PASSWORD_HASH | - | 管理员密码 argon2 哈希，未设置时禁用登录 |
/// | SMTP_HOST / SMTP_PORT / SMTP_USERNAME / SMTP_PASSWORD / SMTP_FROM | - | SMTP 配置，缺失时通知降级为空实现 |
/// | ADMIN_NOTIFY_EMAIL | - | 新订单通知收件人 |
/// | NOTIFY_TIMEOUT_MS | 10000 | 单次通知派发超时 |
/// | PAYMENT_RECIPIENT | Box Office | 移动支付收款人 |
/// | ARCHIVE_RUN_AT | 00:00 | 每日归档时间 (UTC, HH:MM) |
/// | ENFORCE_TOTAL_CONSISTENCY | false | 创建订单时重算总价核对 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/tickets HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志级别
    pub log_level: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    /// 管理员用户名
    pub admin_username: String,
    /// 管理员密码哈希 (argon2 PHC)；未设置时登录被禁用
    pub admin_password_hash: Option<String>,
    /// SMTP 配置；缺失时通知使用空实现
    pub smtp: Option<SmtpConfig>,
    /// 单次通知派发超时 (毫秒)
    pub notify_timeout_ms: u64,
    /// 移动支付收款人
    pub payment_recipient: String,
    /// 每日归档触发时间 (UTC, "HH:MM")
    pub archive_run_at: String,
    /// 创建订单时重算总价核对（默认关闭：原始契约信任客户端总价）
    pub enforce_total_consistency: bool,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            jwt: JwtConfig::default(),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password_hash: std::env::var("ADMIN_PASSWORD_HASH").ok(),
            smtp: smtp_from_env(),
            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10_000),
            payment_recipient: std::env::var("PAYMENT_RECIPIENT")
                .unwrap_or_else(|_| "Box Office".into()),
            archive_run_at: std::env::var("ARCHIVE_RUN_AT").unwrap_or_else(|_| "00:00".into()),
            enforce_total_consistency: std::env::var("ENFORCE_TOTAL_CONSISTENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// 数据库目录: work_dir/database
    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// 日志目录: work_dir/logs
    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    /// 确保工作目录结构存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.database_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

/// SMTP 配置齐全时才启用真实邮件发送
fn smtp_from_env() -> Option<SmtpConfig> {
    let host = std::env::var("SMTP_HOST").ok()?;
    let username = std::env::var("SMTP_USERNAME").ok()?;
    let password = std::env::var("SMTP_PASSWORD").ok()?;
    let from = std::env::var("SMTP_FROM").ok()?;
    let port = std::env::var("SMTP_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(587);

    Some(SmtpConfig {
        host,
        port,
        username,
        password,
        from,
        admin_email: std::env::var("ADMIN_NOTIFY_EMAIL").ok(),
    })
}
