use hintsweeper_client::{Cell, GameEvent, GameParams, GameState, HintsweeperGame, Pos, SectionBody};
use tokio::time::{Duration, sleep};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let game = HintsweeperGame::new("http://localhost:8000")?;
    let mut events = game.subscribe_to_events().await;

    let event_handler = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                GameEvent::Initialized { params } => println!(
                    "🎮 New game: {}x{} with {} mines{}",
                    params.width,
                    params.height,
                    params.mines,
                    if params.timed { " (timed)" } else { "" }
                ),
                GameEvent::BoardUpdated { changed_positions } => {
                    println!("📋 {} cells updated", changed_positions.len())
                }
                GameEvent::HudUpdated { hud } => println!(
                    "🚩 {} mines left, {} hints used",
                    hud.mines_display(),
                    hud.hints
                ),
                GameEvent::TimerTicked { timer } => {
                    println!("⏱️ {}: {}", timer.header(), timer.text())
                }
                GameEvent::StatusChanged { status } => println!("🏁 Status: {:?}", status),
                GameEvent::Finished { result, scoreboard } => {
                    println!("📜 {}", result.line());
                    print_scoreboard(&scoreboard);
                }
                GameEvent::ServerError { message } => println!("⚠️ Server refused: {}", message),
                GameEvent::ConnectionLost => {
                    println!("🔌 Connection lost!");
                    break;
                }
            }
        }
    });

    let params = game.start_game(GameParams::default().timed(true)).await?;
    println!(
        "Game {} started on {}x{}",
        game.get_game_id().await.unwrap_or_default(),
        params.width,
        params.height
    );
    sleep(Duration::from_millis(100)).await;

    // The free big hint of a timed game points at an empty cell.
    if let Some(state) = game.get_state().await {
        display_board(&state);
        if let Some(pos) = hinted_cell(&state) {
            println!("Revealing hinted cell {}...", pos);
            game.reveal(pos).await?;
            sleep(Duration::from_millis(100)).await;
        }
    }

    println!("\nAsking for a small hint...");
    game.hint(false).await?;
    sleep(Duration::from_millis(100)).await;

    if let Some(state) = game.get_state().await {
        display_board(&state);
        if let Some(pos) = hinted_cell(&state) {
            game.reveal(pos).await?;
        }
    }

    println!("\nFlagging (0, 0) and pausing...");
    game.flag(Pos { x: 0, y: 0 }).await?;
    game.pause().await?;
    sleep(Duration::from_secs(2)).await;
    game.resume().await?;
    sleep(Duration::from_secs(2)).await;

    if let Some(state) = game.get_state().await {
        display_board(&state);
        println!("Cell counts: {:?}", state.count_cells());
    }

    game.disconnect().await?;
    event_handler.abort();
    let _ = event_handler.await;

    Ok(())
}

fn hinted_cell(state: &GameState) -> Option<Pos> {
    state.board.iter().enumerate().find_map(|(y, row)| {
        row.iter()
            .position(|cell| matches!(cell, Cell::Hidden { hinted: true }))
            .map(|x| Pos { x, y })
    })
}

fn display_board(state: &GameState) {
    for (y, row) in state.board.iter().enumerate() {
        print!("  ");
        for cell in row {
            print!("{:2}", cell.to_string());
        }
        println!("  {}", y);
    }

    print!("  ");
    for x in 0..state.params.width {
        print!("{:2}", x);
    }
    println!();
}

fn print_scoreboard(scoreboard: &hintsweeper_client::ScoreboardView) {
    for section in &scoreboard.sections {
        println!("{}", section.header);
        match &section.body {
            SectionBody::Flat { entries } => {
                for entry in entries {
                    println!("  {}", entry.line);
                }
            }
            SectionBody::Split { wins, losses } => {
                for group in [wins, losses] {
                    println!("  {}", group.title);
                    for entry in &group.entries {
                        let marker = if entry.latest { "→" } else { " " };
                        println!("  {} {}", marker, entry.line);
                    }
                }
            }
        }
    }
}
