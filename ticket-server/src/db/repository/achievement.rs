//! Achievement Repository
//!
//! 事件衍生的成就使用确定性 ID（等于来源事件的 key），
//! 重复创建在存储层被拒绝，归档任务因此天然幂等。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Achievement, AchievementKind, Event};
use crate::utils::time::now_millis;
use surrealdb::engine::local::Db;
use surrealdb::Surreal;

const TABLE: &str = "achievement";

#[derive(Clone)]
pub struct AchievementRepository {
    base: BaseRepository,
}

impl AchievementRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all achievements, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Achievement>> {
        let achievements: Vec<Achievement> = self
            .base
            .db()
            .query("SELECT * FROM achievement ORDER BY date DESC")
            .await?
            .take(0)?;
        Ok(achievements)
    }

    /// Create an administrator-authored achievement
    pub async fn create(&self, achievement: Achievement) -> RepoResult<Achievement> {
        let created: Option<Achievement> =
            self.base.db().create(TABLE).content(achievement).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create achievement".to_string()))
    }

    /// Derive an achievement from an archived event.
    ///
    /// The record id is the source event's key, so running this twice
    /// for the same event creates exactly one row. Returns `false` when
    /// the row already existed.
    pub async fn create_for_event(&self, event: &Event) -> RepoResult<bool> {
        let event_id = event
            .id
            .as_ref()
            .ok_or_else(|| RepoError::Validation("event has no id".to_string()))?;
        let key = event_id.key().to_string();

        let row = Achievement {
            id: None,
            title: event.title.clone(),
            description: Some(event.description.clone()),
            date: Some(event.date),
            image: Some(event.image.clone()),
            kind: AchievementKind::Event,
            source_event: Some(event_id.clone()),
            is_manual: false,
            created_at: now_millis(),
        };

        let result: Result<Option<Achievement>, surrealdb::Error> =
            self.base.db().create((TABLE, key)).content(row).await;

        match result {
            Ok(Some(_)) => Ok(true),
            Ok(None) => Err(RepoError::Database(
                "Failed to create achievement".to_string(),
            )),
            Err(e) => match RepoError::from(e) {
                RepoError::Duplicate(_) => Ok(false),
                other => Err(other),
            },
        }
    }
}
