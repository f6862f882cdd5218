//! 时间工具函数
//!
//! 所有持久化时间戳统一使用 Unix millis (UTC)，
//! repository 层只接收 `i64`。

use chrono::{NaiveTime, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// 解析每日运行时间字符串 (HH:MM)，失败返回 00:00
pub fn parse_run_at(run_at: &str) -> NaiveTime {
    NaiveTime::parse_from_str(run_at, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse daily run time '{}': {}, falling back to 00:00",
            run_at,
            e
        );
        NaiveTime::MIN
    })
}

/// 计算距离下一次每日触发时间的 Duration (UTC)
pub fn duration_until_next(run_at: NaiveTime) -> std::time::Duration {
    let now = Utc::now();
    let today = now.date_naive();

    let target_date = if now.time() >= run_at {
        // 今天的触发时间已过，等明天
        today + chrono::Duration::days(1)
    } else {
        today
    };

    let target = target_date.and_time(run_at).and_utc();
    let duration = target.signed_duration_since(now);
    if duration.num_seconds() <= 0 {
        // Safety: 不应该发生，但以防万一用 1 分钟兜底
        std::time::Duration::from_secs(60)
    } else {
        duration
            .to_std()
            .unwrap_or(std::time::Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_run_at_accepts_hh_mm() {
        let t = parse_run_at("02:30");
        assert_eq!(t, NaiveTime::from_hms_opt(2, 30, 0).unwrap());
    }

    #[test]
    fn parse_run_at_falls_back_to_midnight() {
        assert_eq!(parse_run_at("not-a-time"), NaiveTime::MIN);
    }

    #[test]
    fn duration_until_next_is_positive_and_bounded() {
        let d = duration_until_next(NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert!(d.as_secs() > 0);
        // never more than 24h away
        assert!(d.as_secs() <= 24 * 3600);
    }
}
