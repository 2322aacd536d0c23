/// Delay between admin confirmation and the first follow-up, in seconds.
pub const DEFAULT_FOLLOW_UP_DELAY_SECS: i64 = 2 * 60;

/// Minimum time between two follow-ups for the same order, in seconds.
pub const DEFAULT_FOLLOW_UP_COOLDOWN_SECS: i64 = 5 * 60;

/// Interval of the background follow-up poll, in seconds.
pub const DEFAULT_FOLLOW_UP_INTERVAL_SECS: u64 = 60;

/// Upper bound for a single outbound notification attempt, in seconds.
pub const DEFAULT_NOTIFICATION_TIMEOUT_SECS: u64 = 15;

/// Default page size for automation log listings.
pub const DEFAULT_LOG_PAGE_SIZE: i64 = 100;

/// Base URL used to build deep links when none is configured.
pub const DEFAULT_APP_BASE_URL: &str = "http://localhost:3000";

/// Upper bound for the configurable follow-up delay and cooldown (one year).
pub const MAX_FOLLOW_UP_WINDOW_SECS: i64 = 365 * 24 * 60 * 60;
