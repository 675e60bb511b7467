use hintsweeper_server::{
    build,
    cleanup::start_cleanup_task,
    config::{CleanupSettings, GameSettings},
    logic::Games,
};
use rocket::{
    Build, Rocket,
    fairing::{Fairing, Info, Kind},
};
use tracing::{info, warn};

struct CleanupFairing;

#[rocket::async_trait]
impl Fairing for CleanupFairing {
    fn info(&self) -> Info {
        Info {
            name: "Cleanup Task",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, rocket: Rocket<Build>) -> rocket::fairing::Result {
        if let Some(games) = rocket.state::<Games>() {
            let games = games.clone();
            tokio::spawn(start_cleanup_task(games, CleanupSettings::from_env()));
        } else {
            warn!("Failed to get games state for cleanup task");
        }
        Ok(rocket)
    }
}

#[rocket::launch]
fn rocket() -> Rocket<Build> {
    tracing_subscriber::fmt::init();
    info!("🚀 Starting Hintsweeper server");

    let settings = GameSettings::from_env();
    info!(
        "⏱️ Timed games get {}s on the clock",
        settings.countdown_seconds
    );

    let rocket = build(settings).attach(CleanupFairing);

    info!("🌐 Server configured with CORS, cleanup task, and routes");
    info!("📡 Endpoints: POST /create, GET /scoreboard, GET /ws");

    rocket
}
