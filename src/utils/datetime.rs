use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Months, Utc};

pub fn parse_rfc3339(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| anyhow!("Invalid RFC 3339 timestamp '{}': {}", input, e))
}

/// Date format shown to members, e.g. "15.06.2025".
pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.format("%d.%m.%Y").to_string()
}

/// Whole days remaining until `expiry`, rounded up. Negative when past.
pub fn days_until(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (expiry - now).num_seconds();
    const DAY: i64 = 86_400;
    if seconds >= 0 {
        (seconds + DAY - 1) / DAY
    } else {
        -((-seconds + DAY - 1) / DAY) + 1
    }
}

/// Membership expiry one calendar month out, clamped at month ends.
pub fn one_month_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(1))
        .unwrap_or_else(|| now + Duration::days(30))
}
