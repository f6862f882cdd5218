//! Database Module
//!
//! Embedded SurrealDB (RocksDB engine on disk, in-memory engine for
//! tests) plus table and index definitions.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use std::path::Path;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

/// 命名空间 / 数据库固定为单租户
const NAMESPACE: &str = "tickets";
const DATABASE: &str = "main";

/// Index definitions mirroring the query paths:
/// token lookup, admin order listing, archival scan, archive wall.
const SCHEMA: &str = r#"
DEFINE INDEX IF NOT EXISTS order_token_idx ON TABLE order FIELDS token;
DEFINE INDEX IF NOT EXISTS order_status_created_idx ON TABLE order FIELDS payment_status, created_at;
DEFINE INDEX IF NOT EXISTS event_date_status_idx ON TABLE event FIELDS date, status;
DEFINE INDEX IF NOT EXISTS achievement_date_idx ON TABLE achievement FIELDS date;
"#;

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database
    pub async fn new(db_path: &Path) -> Result<Self, AppError> {
        let endpoint = db_path.to_string_lossy().into_owned();
        let db = Surreal::new::<RocksDb>(endpoint.as_str())
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        let service = Self::init(db).await?;
        tracing::info!("Database connection established (SurrealDB/RocksDB)");
        Ok(service)
    }

    /// In-memory database for tests
    pub async fn new_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA)
            .await
            .and_then(|response| response.check())
            .map_err(|e| AppError::database(format!("Failed to define schema: {e}")))?;

        Ok(Self { db })
    }
}
