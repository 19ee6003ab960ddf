use std::str::FromStr;
use std::time::Duration;

/// Default entity cache freshness window: 10 minutes.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;

/// Default number of entities fetched in one bulk read.
pub const DEFAULT_ENTITY_FETCH_LIMIT: i64 = 1025;

/// Default per-topic event buffer.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default time a transient notification stays visible.
pub const DEFAULT_NOTIFICATION_DISPLAY_MS: u64 = 3000;

/// Client configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// PostgreSQL URL. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    /// Signed-in user. `None` starts a guest session.
    pub user_id: Option<String>,
    /// Entity cache time-to-live.
    pub cache_ttl: Duration,
    /// Row limit for the bulk entity fetch.
    pub entity_fetch_limit: i64,
    /// Buffer size of each event bus topic.
    pub event_channel_capacity: usize,
    /// How long a notification stays on screen.
    pub notification_display: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default |
    /// |---------------------------|---------|
    /// | `DATABASE_URL`            | unset   |
    /// | `DEXQUEST_USER_ID`        | unset   |
    /// | `CACHE_TTL_SECS`          | `600`   |
    /// | `ENTITY_FETCH_LIMIT`      | `1025`  |
    /// | `EVENT_CHANNEL_CAPACITY`  | `256`   |
    /// | `NOTIFICATION_DISPLAY_MS` | `3000`  |
    pub fn from_env() -> Self {
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Self {
            database_url: non_empty("DATABASE_URL"),
            user_id: non_empty("DEXQUEST_USER_ID"),
            cache_ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS)),
            entity_fetch_limit: env_or("ENTITY_FETCH_LIMIT", DEFAULT_ENTITY_FETCH_LIMIT),
            event_channel_capacity: env_or("EVENT_CHANNEL_CAPACITY", DEFAULT_EVENT_CHANNEL_CAPACITY)
                .max(1),
            notification_display: Duration::from_millis(env_or(
                "NOTIFICATION_DISPLAY_MS",
                DEFAULT_NOTIFICATION_DISPLAY_MS,
            )),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            user_id: None,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            entity_fetch_limit: DEFAULT_ENTITY_FETCH_LIMIT,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            notification_display: Duration::from_millis(DEFAULT_NOTIFICATION_DISPLAY_MS),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset
/// or malformed.
fn env_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Err(_) => default,
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Invalid config value, using default");
            default
        }),
    }
}
