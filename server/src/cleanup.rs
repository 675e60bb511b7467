use tokio::time;
use tracing::{debug, info};

use crate::{config::CleanupSettings, logic::Games};

pub async fn start_cleanup_task(games: Games, settings: CleanupSettings) {
    let mut interval = time::interval(settings.interval);

    info!(
        "Started game cleanup task: checking every {}s, inactive timeout: {}s, active timeout: {}s",
        settings.interval.as_secs(),
        settings.inactive_timeout.as_secs(),
        settings.active_timeout.as_secs()
    );

    loop {
        interval.tick().await;
        cleanup_games(&games, &settings);
    }
}

/// Drop rooms that have been idle or alive for too long. Returns how many
/// went.
pub fn cleanup_games(games: &Games, settings: &CleanupSettings) -> usize {
    let inactive = settings.inactive_timeout.as_secs();
    let active = settings.active_timeout.as_secs();

    // Rooms that are locked right now are in use and skipped.
    let expired: Vec<String> = games
        .iter()
        .filter(|entry| {
            entry
                .value()
                .try_lock()
                .is_ok_and(|game| game.should_cleanup(inactive, active))
        })
        .map(|entry| entry.key().clone())
        .collect();

    for id in &expired {
        if let Some((_, game)) = games.remove(id)
            && let Ok(mut game) = game.try_lock()
        {
            game.stop_ticker();
        }
        debug!("Cleaned up game: {}", id);
    }

    if !expired.is_empty() {
        info!("Cleaned up {} inactive games", expired.len());
    }
    expired.len()
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use dashmap::DashMap;
    use tokio::sync::Mutex;

    use hintsweeper_common::params::GameParams;

    use super::*;
    use crate::{config::GameSettings, logic::Game};

    #[test]
    fn fresh_games_survive() {
        let games: Games = Arc::new(DashMap::new());
        games.insert(
            "abcde".to_string(),
            Arc::new(Mutex::new(Game::new(
                GameParams::default(),
                GameSettings::default(),
            ))),
        );
        assert_eq!(cleanup_games(&games, &CleanupSettings::default()), 0);
        assert!(games.contains_key("abcde"));
    }

    #[test]
    fn locked_games_are_skipped() {
        let games: Games = Arc::new(DashMap::new());
        let game = Arc::new(Mutex::new(Game::new(
            GameParams::default(),
            GameSettings::default(),
        )));
        games.insert("abcde".to_string(), game.clone());
        let settings = CleanupSettings {
            interval: Duration::from_secs(1),
            inactive_timeout: Duration::ZERO,
            active_timeout: Duration::ZERO,
        };

        let _guard = game.try_lock().unwrap();
        assert_eq!(cleanup_games(&games, &settings), 0);
    }
}
