use std::{env, str::FromStr, time::Duration};

use tracing::warn;

/// Read `key` from the environment, falling back to `default` when it is
/// unset or does not parse.
pub fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    /// Budget of a timed session.
    pub countdown_seconds: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            countdown_seconds: 60,
        }
    }
}

impl GameSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            countdown_seconds: env_or("COUNTDOWN_SECONDS", defaults.countdown_seconds).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupSettings {
    pub interval: Duration,
    /// Games without connections are dropped after this long.
    pub inactive_timeout: Duration,
    /// Every game is dropped after this long.
    pub active_timeout: Duration,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            inactive_timeout: Duration::from_secs(600),
            active_timeout: Duration::from_secs(86400),
        }
    }
}

impl CleanupSettings {
    pub fn from_env() -> Self {
        let secs = |key: &str, default: Duration| Duration::from_secs(env_or(key, default.as_secs()));
        let defaults = Self::default();
        Self {
            interval: secs("CLEANUP_INTERVAL_SECONDS", defaults.interval).max(Duration::from_secs(1)),
            inactive_timeout: secs("INACTIVE_GAME_TIMEOUT_SECONDS", defaults.inactive_timeout),
            active_timeout: secs("ACTIVE_GAME_TIMEOUT_SECONDS", defaults.active_timeout),
        }
    }
}

pub fn allowed_origins() -> Vec<String> {
    env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
