use std::sync::Arc;
use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::notify::{NoopNotifier, Notifier, SmtpNotifier};
use crate::orders::{LifecyclePolicy, OrderLifecycle, RedemptionService};
use crate::utils::AppError;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | notifier | Arc<dyn Notifier> | 通知派发 (SMTP 或空实现) |
/// | lifecycle | Arc<OrderLifecycle> | 订单生命周期引擎 |
/// | redemption | Arc<RedemptionService> | 令牌兑换服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
    /// 通知派发
    pub notifier: Arc<dyn Notifier>,
    /// 订单生命周期引擎
    pub lifecycle: Arc<OrderLifecycle>,
    /// 令牌兑换服务
    pub redemption: Arc<RedemptionService>,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/tickets.db)
    /// 3. 通知实现 (SMTP 配置齐全时启用，否则空实现)
    /// 4. JWT、生命周期引擎、兑换服务
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(format!("Failed to create work directory: {e}")))?;

        let db_path = config.database_dir().join("tickets.db");
        let db_service = DbService::new(&db_path).await?;
        let db = db_service.db;

        let notifier: Arc<dyn Notifier> = match &config.smtp {
            Some(smtp) => {
                let notifier = SmtpNotifier::new(smtp.clone())
                    .map_err(|e| AppError::internal(format!("SMTP setup failed: {e}")))?;
                tracing::info!(host = %smtp.host, "SMTP notifier enabled");
                Arc::new(notifier)
            }
            None => {
                tracing::info!("SMTP not configured, notifications disabled");
                Arc::new(NoopNotifier)
            }
        };

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        let policy = LifecyclePolicy {
            enforce_total_consistency: config.enforce_total_consistency,
            payment_recipient: config.payment_recipient.clone(),
            notify_timeout: Duration::from_millis(config.notify_timeout_ms),
        };
        let lifecycle = Arc::new(OrderLifecycle::new(db.clone(), notifier.clone(), policy));
        let redemption = Arc::new(RedemptionService::new(db.clone()));

        Ok(Self {
            config: config.clone(),
            db,
            jwt_service,
            notifier,
            lifecycle,
            redemption,
        })
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
