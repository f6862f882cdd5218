//! 金额精度辅助
//!
//! 金额以 f64 形式进出（客户端提供的总价按原样信任存储），
//! 但需要重算核对时必须用 Decimal，避免浮点累积误差。

use crate::db::models::TicketLine;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// f64 → Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Decimal → f64 (rounded to 2 decimal places)
pub fn to_f64(value: Decimal) -> f64 {
    value.round_dp(2).to_f64().unwrap_or(0.0)
}

/// Recompute the order total from its ticket lines
pub fn lines_total(lines: &[TicketLine]) -> Decimal {
    lines
        .iter()
        .map(|line| to_decimal(line.price) * Decimal::from(line.quantity))
        .sum()
}
