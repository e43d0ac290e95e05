/// Derived values shown on the dashboard and leaderboard
///
/// All functions here are pure.
///
/// # Rating tiers
///
/// The dashboard and the public leaderboard rate researchers with two
/// different step functions. They agree at the top tier and diverge below
/// it (65 contributions rate 4.85 on the dashboard but 4.7 on the
/// leaderboard). Both tables are kept as they are; do not merge them
/// without a product decision.

use chrono::{DateTime, Utc};

/// Dashboard tiers: (minimum contributions, rating)
const DASHBOARD_TIERS: [(u32, f64); 5] = [(80, 4.9), (60, 4.85), (40, 4.8), (20, 4.75), (10, 4.7)];
const DASHBOARD_FLOOR: f64 = 4.6;

/// Leaderboard tiers: (minimum contributions, rating)
const LEADERBOARD_TIERS: [(u32, f64); 5] = [(80, 4.9), (60, 4.7), (40, 4.5), (20, 4.3), (10, 4.1)];
const LEADERBOARD_FLOOR: f64 = 4.0;

fn tiered(contributions: u32, tiers: &[(u32, f64)], floor: f64) -> f64 {
    tiers
        .iter()
        .find(|(min, _)| contributions >= *min)
        .map(|(_, rating)| *rating)
        .unwrap_or(floor)
}

/// Rating used by the admin dashboard's top-researcher panel
///
/// ```
/// use mathcms_shared::stats::dashboard_rating;
///
/// assert_eq!(dashboard_rating(85), 4.9);
/// assert_eq!(dashboard_rating(65), 4.85);
/// ```
pub fn dashboard_rating(contributions: u32) -> f64 {
    tiered(contributions, &DASHBOARD_TIERS, DASHBOARD_FLOOR)
}

/// Rating used by the public leaderboard
///
/// ```
/// use mathcms_shared::stats::leaderboard_rating;
///
/// assert_eq!(leaderboard_rating(85), 4.9);
/// assert_eq!(leaderboard_rating(65), 4.7);
/// ```
pub fn leaderboard_rating(contributions: u32) -> f64 {
    tiered(contributions, &LEADERBOARD_TIERS, LEADERBOARD_FLOOR)
}

/// Formats `timestamp` relative to `now` at day/hour granularity
///
/// Timestamps in the future, or less than an hour old, read "just now".
pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);

    let days = elapsed.num_days();
    if days >= 1 {
        return format!("{} {} ago", days, plural(days, "day"));
    }

    let hours = elapsed.num_hours();
    if hours >= 1 {
        return format!("{} {} ago", hours, plural(hours, "hour"));
    }

    "just now".to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}

/// Period-over-period growth in percent, rounded to one decimal
///
/// A zero baseline reports 100% growth when anything was added and 0%
/// otherwise.
pub fn growth_percentage(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }

    let raw = (current - previous) as f64 / previous as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
