use serde::{Deserialize, Serialize};

use crate::{
    models::{Cell, GameStatus, Hud, Pos, TimerView},
    params::{GameParams, ParamsRequest},
    results::{ResultRecord, ScoreboardView},
};

/// Player input. Primary click reveals, secondary click flags, double click
/// chords.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "action")]
pub enum ClientMessage {
    #[serde(rename = "reveal")]
    Reveal { pos: Pos },
    #[serde(rename = "flag")]
    Flag { pos: Pos },
    #[serde(rename = "chord")]
    Chord { pos: Pos },
    #[serde(rename = "hint")]
    Hint { big: bool },
    #[serde(rename = "pause")]
    Pause,
    #[serde(rename = "resume")]
    Resume,
    #[serde(rename = "restart")]
    Restart { params: ParamsRequest },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CellUpdate {
    pub pos: Pos,
    pub value: Cell,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ServerMessage {
    #[serde(rename = "init")]
    Init {
        params: GameParams,
        field: Vec<Vec<Cell>>,
        status: GameStatus,
        hud: Hud,
    },
    #[serde(rename = "update")]
    Update {
        updates: Vec<CellUpdate>,
        status: GameStatus,
        hud: Hud,
    },
    #[serde(rename = "tick")]
    Tick { timer: TimerView },
    #[serde(rename = "finished")]
    Finished {
        result: ResultRecord,
        scoreboard: ScoreboardView,
    },
    #[serde(rename = "error")]
    Error { message: String },
}
