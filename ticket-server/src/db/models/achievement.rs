//! Achievement Model
//!
//! 成就墙条目。事件归档任务为每个过期事件生成一条 `kind = event`
//! 的记录（`is_manual = false`）；管理员也可以手工添加其他条目。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AchievementKind {
    Event,
    Award,
    Milestone,
    Other,
}

impl Default for AchievementKind {
    fn default() -> Self {
        AchievementKind::Other
    }
}

/// Achievement entity (append-only for event-derived rows)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub kind: AchievementKind,
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_event: Option<RecordId>,
    pub is_manual: bool,
    pub created_at: i64,
}

/// Manual achievement for creation (admin-authored)
#[derive(Debug, Clone, Deserialize)]
pub struct AchievementCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date: Option<i64>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: AchievementKind,
}
