//! The one-second heartbeat behind the game clock. Each game has at most one
//! ticker task, reconciled against the clock after every action.

use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use tokio::{sync::Mutex, time};
use tracing::debug;

use crate::logic::{Game, SharedGame};

/// Spawn a ticker when the clock runs without one, abort it when the clock
/// has stopped. Calling this twice in a row changes nothing.
pub fn sync_ticker(shared: &SharedGame, game: &mut Game) {
    let running = game.session().clock().is_running();
    let alive = game.ticker.as_ref().is_some_and(|ticker| !ticker.is_finished());

    match (running, alive) {
        (true, false) => {
            debug!("Starting ticker");
            game.ticker = Some(tokio::spawn(run_ticker(Arc::downgrade(shared))));
        }
        (false, true) => {
            debug!("Stopping ticker");
            game.stop_ticker();
        }
        _ => {}
    }
}

async fn run_ticker(weak: Weak<Mutex<Game>>) {
    let mut interval = time::interval(Duration::from_secs(1));
    // The first tick of an interval completes immediately.
    interval.tick().await;

    loop {
        interval.tick().await;
        let Some(game) = weak.upgrade() else {
            break;
        };
        let mut game = game.lock().await;
        game.tick().await;
        if !game.session().clock().is_running() {
            debug!("Clock stopped, ticker exits");
            game.ticker = None;
            break;
        }
    }
}
