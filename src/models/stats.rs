use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// Fixed caller alphabet: sixteen staff slots, not derived from data.
/// Callers with zero activity still get a stats row.
pub const CALLERS: [&str; 16] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P",
];

/// Reporting window for caller statistics. Unknown period strings fall back
/// to `Day`, matching the legacy behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn parse(s: &str) -> Self {
        match s {
            "week" => Period::Week,
            "month" => Period::Month,
            _ => Period::Day,
        }
    }

    /// SQL predicate over the given timestamp column. The column name is a
    /// compile-time constant supplied by the repository, never user input.
    pub fn date_condition(&self, column: &str) -> String {
        match self {
            Period::Day => format!("DATE({column}) = CURRENT_DATE"),
            Period::Week => format!("{column} >= CURRENT_DATE - INTERVAL '7 days'"),
            Period::Month => format!("{column} >= CURRENT_DATE - INTERVAL '30 days'"),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyCustomerStats {
    pub date: NaiveDate,
    pub customer_count: i64,
    pub reservation_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerStats {
    pub caller: String,
    pub total_customers: i64,
    pub reservation_confirm: i64,
    /// Confirmed reservations per selection, percent, truncated to 2 decimals.
    pub confirm_rate: f64,
    pub selection_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdSourceStats {
    pub ad_source: String,
    pub count: i64,
}

/// Rate of confirmed reservations over caller selections, as a percentage.
/// Division by zero is defined as 0. Truncated (not rounded) to 2 decimals,
/// as the legacy report did.
pub fn confirm_rate(reservation_confirm: i64, selection_count: i64) -> f64 {
    if selection_count <= 0 {
        return 0.0;
    }
    let rate = reservation_confirm as f64 * 100.0 / selection_count as f64;
    (rate * 100.0).trunc() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_period_defaults_to_day() {
        assert_eq!(Period::parse("quarter"), Period::Day);
        assert_eq!(Period::parse(""), Period::Day);
        assert_eq!(Period::parse("week"), Period::Week);
        assert_eq!(Period::parse("month"), Period::Month);
    }

    #[test]
    fn zero_selections_means_zero_rate() {
        assert_eq!(confirm_rate(3, 0), 0.0);
    }

    #[test]
    fn rate_is_truncated_to_two_decimals() {
        // 1/3 → 33.333... → 33.33
        assert_eq!(confirm_rate(1, 3), 33.33);
        // 2/3 → 66.666... → 66.66 (truncation, not rounding)
        assert_eq!(confirm_rate(2, 3), 66.66);
    }

    #[test]
    fn full_confirmation_is_capped_at_hundred() {
        assert_eq!(confirm_rate(5, 5), 100.0);
    }

    #[test]
    fn caller_alphabet_is_sixteen_slots() {
        assert_eq!(CALLERS.len(), 16);
        assert_eq!(CALLERS[0], "A");
        assert_eq!(CALLERS[15], "P");
    }
}
