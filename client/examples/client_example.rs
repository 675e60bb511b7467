use hintsweeper_client::{
    ClientMessage, HintsweeperClient, HintsweeperWebSocket, ParamInput, ParamsRequest, Pos,
    ServerMessage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt::init();

    let client = HintsweeperClient::new("http://localhost:8000")?;

    // Raw form input; the server clamps it.
    let request = ParamsRequest {
        width: Some(ParamInput::Text("9".to_string())),
        height: Some(ParamInput::Number(9.0)),
        mines: None,
        timed: false,
    };
    let created = client.create_game(request).await?;
    println!(
        "Created game {} ({}x{}, {} mines)",
        created.id, created.params.width, created.params.height, created.params.mines
    );

    let mut ws = HintsweeperWebSocket::connect(&client.websocket_url(&created.id)?).await?;

    if let Some(ServerMessage::Init { field, hud, .. }) = ws.wait_for_init().await? {
        println!("{}: {}", hud.timer.header(), hud.timer.text());
        for row in &field {
            let line: String = row.iter().map(|cell| cell.to_string()).collect();
            println!("{}", line);
        }
    }

    // Cells can be addressed by coordinates or by their `cell-ROW-COL` key.
    ws.reveal("cell-4-4".parse::<Pos>()?).await?;
    print_next(&mut ws).await?;

    ws.flag(Pos { x: 0, y: 0 }).await?;
    print_next(&mut ws).await?;

    // Off the board: the server answers with an error.
    ws.send_message(ClientMessage::Reveal {
        pos: Pos { x: 40, y: 0 },
    })
    .await?;
    print_next(&mut ws).await?;

    let scoreboard = client.scoreboard(&created.id).await?;
    println!("Scoreboard has {} sections", scoreboard.sections.len());

    ws.close().await?;
    Ok(())
}

async fn print_next(ws: &mut HintsweeperWebSocket) -> hintsweeper_client::Result<()> {
    match ws.receive_message().await? {
        Some(ServerMessage::Update {
            updates,
            status,
            hud,
        }) => {
            println!(
                "{} cells changed, status {:?}, {} mines left",
                updates.len(),
                status,
                hud.mines_display()
            );
            for update in updates {
                println!("  {} -> {}", update.pos, update.value);
            }
        }
        Some(ServerMessage::Error { message }) => println!("Error: {}", message),
        Some(message) => println!("Received: {:?}", message),
        None => println!("Connection closed"),
    }
    Ok(())
}
