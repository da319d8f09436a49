//! Text content of the summary image.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

const TRILLION: f64 = 1_000_000_000_000.0;
const BILLION: f64 = 1_000_000_000.0;
const MILLION: f64 = 1_000_000.0;

/// Compact dollar amount: `$1.23T`, `$4.56B`, `$7.89M` or `$123.45`.
/// A zero estimate is shown as `N/A`.
pub fn format_gdp(gdp: Decimal) -> String {
    let value = gdp.to_f64().unwrap_or(0.0);
    if value == 0.0 {
        return "N/A".to_string();
    }
    if value >= TRILLION {
        format!("${:.2}T", value / TRILLION)
    } else if value >= BILLION {
        format!("${:.2}B", value / BILLION)
    } else if value >= MILLION {
        format!("${:.2}M", value / MILLION)
    } else {
        format!("${:.2}", value)
    }
}

/// One fixed-width table row.
pub fn format_row(rank: &str, name: &str, currency: &str, gdp: &str) -> String {
    format!("{:<4} {:<25} {:<10} {}", rank, name, currency, gdp)
}

pub fn format_total_line(total: i64) -> String {
    format!("Total Countries Cached: {}", total)
}

pub fn format_refresh_line(refreshed_at: DateTime<Utc>) -> String {
    format!("Last Refresh: {}", refreshed_at.format("%Y-%m-%d %H:%M:%S UTC"))
}
