//! 事件归档调度器
//!
//! 启动时补扫一次，运行期间按 `archive_run_at` 每日触发。
//!
//! 每个过期事件独立处理：先以确定性 ID 创建衍生成就（重复创建被
//! 存储层拒绝），再条件更新事件状态（仅当 status != 'past'）。
//! 两步都幂等，任务因此可以安全地重复运行或与自身并发运行。

use chrono::NaiveTime;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::db::models::Event;
use crate::db::repository::{AchievementRepository, EventRepository, RepoResult};
use crate::utils::time::{duration_until_next, now_millis};

/// Outcome of one archival scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    /// Events matching the expiry filter
    pub scanned: usize,
    /// Events this run actually transitioned
    pub archived: usize,
    /// Events that errored (logged and skipped)
    pub failed: usize,
}

/// 事件归档调度器
///
/// 注册为后台任务，在 `Server::run()` 中启动。
pub struct ArchivalScheduler {
    events: EventRepository,
    achievements: AchievementRepository,
    shutdown: CancellationToken,
    run_at: NaiveTime,
}

impl ArchivalScheduler {
    pub fn new(db: Surreal<Db>, shutdown: CancellationToken, run_at: NaiveTime) -> Self {
        Self {
            events: EventRepository::new(db.clone()),
            achievements: AchievementRepository::new(db),
            shutdown,
            run_at,
        }
    }

    /// 主循环：启动补扫 → 每日触发
    pub async fn run(self) {
        tracing::info!("Event archival scheduler started");

        // 1. 启动补扫（上次停机期间可能有事件过期）
        match self.run_once().await {
            Ok(stats) if stats.scanned > 0 => {
                tracing::info!(
                    archived = stats.archived,
                    failed = stats.failed,
                    "Startup catch-up archival finished"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::error!("Startup archival scan failed: {}", e),
        }

        // 2. 每日循环
        self.periodic_loop().await;

        tracing::info!("Event archival scheduler stopped");
    }

    /// 周期循环：每天在 archive_run_at (UTC) 触发
    async fn periodic_loop(&self) {
        loop {
            let sleep_duration = duration_until_next(self.run_at);
            tracing::info!(
                "Next archival run in {} minutes",
                sleep_duration.as_secs() / 60
            );

            tokio::select! {
                _ = tokio::time::sleep(sleep_duration) => {}
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Archival scheduler received shutdown signal");
                    return;
                }
            }

            tracing::info!("Running event archival job...");
            if let Err(e) = self.run_once().await {
                tracing::error!("Event archival run failed: {}", e);
            }
        }
    }

    /// One scan-and-transition pass. Public so tests (and operators)
    /// can drive it directly; safe to call at any time.
    pub async fn run_once(&self) -> RepoResult<ArchiveStats> {
        let now = now_millis();
        let expired = self.events.find_expired(now).await?;

        if expired.is_empty() {
            tracing::info!("No events to archive");
            return Ok(ArchiveStats::default());
        }

        let mut stats = ArchiveStats {
            scanned: expired.len(),
            ..Default::default()
        };

        for event in expired {
            if self.shutdown.is_cancelled() {
                tracing::info!("Archival interrupted by shutdown");
                break;
            }

            match self.archive_one(&event).await {
                Ok(true) => {
                    stats.archived += 1;
                    tracing::info!("Archived event: {}", event.title);
                }
                Ok(false) => {
                    // Lost the race to a concurrent run; nothing to do
                    tracing::debug!("Event already archived: {}", event.title);
                }
                Err(e) => {
                    stats.failed += 1;
                    tracing::error!(title = %event.title, "Failed to archive event: {}", e);
                }
            }
        }

        tracing::info!("Archived {} event(s)", stats.archived);
        Ok(stats)
    }

    /// Archive a single event.
    ///
    /// Achievement first: if we crash between the two writes the event
    /// stays eligible for the next scan, and the deterministic id
    /// dedupes the retried creation.
    async fn archive_one(&self, event: &Event) -> RepoResult<bool> {
        self.achievements.create_for_event(event).await?;
        let transitioned = self
            .events
            .archive(event.id.as_ref().ok_or_else(|| {
                crate::db::repository::RepoError::Validation("event has no id".to_string())
            })?)
            .await?;
        Ok(transitioned.is_some())
    }
}
