use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{format::format_duration, params::GameParams};

/// What the player is allowed to see of a single cell.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
pub enum Cell {
    #[serde(rename = "hidden")]
    Hidden { hinted: bool },
    #[serde(rename = "flagged")]
    Flagged,
    #[serde(rename = "revealed")]
    Revealed { adjacent: u8 },
    /// An untouched mine, shown once the game is over.
    #[serde(rename = "mine")]
    Mine,
    /// The mine the player stepped on.
    #[serde(rename = "exploded")]
    Exploded,
    #[serde(rename = "correctFlag")]
    CorrectFlag,
    #[serde(rename = "wrongFlag")]
    WrongFlag,
}

impl Cell {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Cell::Hidden { .. } | Cell::Flagged)
    }
}

impl fmt::Display for Cell {
    /// Single-character marker for terminal renderings.
    ///
    /// | Cell               | Char |
    /// | ------------------ | ---- |
    /// | `Hidden`           | `◻`  |
    /// | `Hidden` (hinted)  | `◆`  |
    /// | `Flagged`          | `⚑`  |
    /// | `Revealed(0)`      | ` `  |
    /// | `Revealed(n)`      | `n`  |
    /// | `Mine`             | `*`  |
    /// | `Exploded`         | `✹`  |
    /// | `CorrectFlag`      | `✓`  |
    /// | `WrongFlag`        | `✗`  |
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Hidden { hinted: false } => write!(f, "◻"),
            Cell::Hidden { hinted: true } => write!(f, "◆"),
            Cell::Flagged => write!(f, "⚑"),
            Cell::Revealed { adjacent: 0 } => write!(f, " "),
            Cell::Revealed { adjacent } => write!(f, "{}", adjacent),
            Cell::Mine => write!(f, "*"),
            Cell::Exploded => write!(f, "✹"),
            Cell::CorrectFlag => write!(f, "✓"),
            Cell::WrongFlag => write!(f, "✗"),
        }
    }
}

/// A board position: `x` is the column, `y` the row.
///
/// Deserializes either from `{"x": .., "y": ..}` or from a composite
/// `"cell-ROW-COL"` key. A malformed key fails deserialization outright.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "PosRepr")]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PosRepr {
    Coords { x: usize, y: usize },
    Key(String),
}

impl TryFrom<PosRepr> for Pos {
    type Error = CellKeyError;

    fn try_from(value: PosRepr) -> Result<Self, Self::Error> {
        match value {
            PosRepr::Coords { x, y } => Ok(Pos { x, y }),
            PosRepr::Key(key) => key.parse(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CellKeyError {
    #[error("cell key `{0}` does not start with `cell-`")]
    MissingPrefix(String),
    #[error("cell key `{0}` must hold exactly a row and a column")]
    WrongArity(String),
    #[error("cell key `{key}` has a non-numeric coordinate `{part}`")]
    NotANumber { key: String, part: String },
}

impl Pos {
    /// Composite key used by the browser front end, `cell-ROW-COL`.
    pub fn key(&self) -> String {
        format!("cell-{}-{}", self.y, self.x)
    }
}

impl FromStr for Pos {
    type Err = CellKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let rest = key
            .strip_prefix("cell-")
            .ok_or_else(|| CellKeyError::MissingPrefix(key.to_string()))?;

        let parts: Vec<&str> = rest.split('-').collect();
        let &[row, col] = parts.as_slice() else {
            return Err(CellKeyError::WrongArity(key.to_string()));
        };

        let parse = |part: &str| {
            part.parse::<usize>()
                .map_err(|_| CellKeyError::NotANumber {
                    key: key.to_string(),
                    part: part.to_string(),
                })
        };

        Ok(Pos {
            x: parse(col)?,
            y: parse(row)?,
        })
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockState {
    /// Count-up clock waiting for the first reveal.
    Idle,
    Running,
    Paused,
    Stopped,
    /// Countdown ran out of time.
    Expired,
}

/// Severity tier of the remaining-mines counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MineBand {
    Initial,
    StartingToWin,
    ContinuingToWin,
    AlmostWon,
    Negative,
}

impl MineBand {
    pub fn for_count(mines_left: i64, mines_total: usize) -> Self {
        if mines_left < 0 {
            return MineBand::Negative;
        }
        if mines_total == 0 {
            return MineBand::AlmostWon;
        }

        let ratio = mines_left as f64 / mines_total as f64;
        if ratio <= 0.25 {
            MineBand::AlmostWon
        } else if ratio <= 0.5 {
            MineBand::ContinuingToWin
        } else if ratio <= 0.75 {
            MineBand::StartingToWin
        } else {
            MineBand::Initial
        }
    }
}

/// Severity tier of the countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerBand {
    Normal,
    Yellow,
    Orange,
    Red,
}

impl TimerBand {
    pub fn for_remaining(remaining: u32, budget: u32) -> Self {
        if budget == 0 {
            return TimerBand::Red;
        }

        let ratio = remaining as f64 / budget as f64;
        if ratio >= 0.7 {
            TimerBand::Normal
        } else if ratio > 0.5 {
            TimerBand::Yellow
        } else if ratio > 0.25 {
            TimerBand::Orange
        } else {
            TimerBand::Red
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerView {
    pub timed: bool,
    pub state: ClockState,
    /// Elapsed plus penalty for count-up, remaining for countdown.
    pub seconds: u32,
    pub band: Option<TimerBand>,
}

impl TimerView {
    pub fn text(&self) -> String {
        if !self.timed && self.state == ClockState::Idle {
            return "Timer will start as soon as any cell on the field is clicked.".to_string();
        }
        format_duration(self.seconds as u64)
    }

    pub fn header(&self) -> &'static str {
        if self.timed {
            "Remaining time"
        } else {
            "Elapsed time"
        }
    }
}

/// Everything around the board that the front end keeps on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hud {
    pub mines_left: i64,
    pub mines_total: usize,
    pub large_hint_available: bool,
    pub hints: u32,
    pub penalty_seconds: u32,
    pub paused: bool,
    pub timer: TimerView,
}

impl Hud {
    /// The counter never shows a negative number.
    pub fn mines_display(&self) -> String {
        if self.mines_left >= 0 {
            self.mines_left.to_string()
        } else {
            "?".to_string()
        }
    }

    pub fn mine_band(&self) -> MineBand {
        MineBand::for_count(self.mines_left, self.mines_total)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateResponse {
    pub id: String,
    pub params: GameParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_composite_keys() {
        assert_eq!("cell-3-7".parse::<Pos>(), Ok(Pos { x: 7, y: 3 }));
        assert_eq!(Pos { x: 7, y: 3 }.key(), "cell-3-7");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(matches!(
            "row-1-2".parse::<Pos>(),
            Err(CellKeyError::MissingPrefix(_))
        ));
        assert!(matches!(
            "cell-1-2-3".parse::<Pos>(),
            Err(CellKeyError::WrongArity(_))
        ));
        assert!(matches!(
            "cell-1".parse::<Pos>(),
            Err(CellKeyError::WrongArity(_))
        ));
        assert!(matches!(
            "cell--1-2".parse::<Pos>(),
            Err(CellKeyError::WrongArity(_))
        ));
        assert!(matches!(
            "cell-a-2".parse::<Pos>(),
            Err(CellKeyError::NotANumber { .. })
        ));
    }

    #[test]
    fn pos_deserializes_from_coords_or_key() {
        let pos: Pos = serde_json::from_str(r#"{"x": 4, "y": 1}"#).unwrap();
        assert_eq!(pos, Pos { x: 4, y: 1 });

        let pos: Pos = serde_json::from_str(r#""cell-1-4""#).unwrap();
        assert_eq!(pos, Pos { x: 4, y: 1 });

        assert!(serde_json::from_str::<Pos>(r#""cell-x-4""#).is_err());
    }

    #[test]
    fn mine_band_thresholds() {
        assert_eq!(MineBand::for_count(20, 20), MineBand::Initial);
        assert_eq!(MineBand::for_count(16, 20), MineBand::Initial);
        assert_eq!(MineBand::for_count(15, 20), MineBand::StartingToWin);
        assert_eq!(MineBand::for_count(10, 20), MineBand::ContinuingToWin);
        assert_eq!(MineBand::for_count(5, 20), MineBand::AlmostWon);
        assert_eq!(MineBand::for_count(0, 20), MineBand::AlmostWon);
        assert_eq!(MineBand::for_count(-1, 20), MineBand::Negative);
    }

    #[test]
    fn timer_band_thresholds() {
        assert_eq!(TimerBand::for_remaining(60, 60), TimerBand::Normal);
        assert_eq!(TimerBand::for_remaining(42, 60), TimerBand::Normal);
        assert_eq!(TimerBand::for_remaining(41, 60), TimerBand::Yellow);
        assert_eq!(TimerBand::for_remaining(30, 60), TimerBand::Orange);
        assert_eq!(TimerBand::for_remaining(15, 60), TimerBand::Red);
        assert_eq!(TimerBand::for_remaining(0, 60), TimerBand::Red);
    }

    #[test]
    fn negative_counter_is_masked() {
        let hud = Hud {
            mines_left: -2,
            mines_total: 10,
            large_hint_available: false,
            hints: 0,
            penalty_seconds: 0,
            paused: false,
            timer: TimerView {
                timed: false,
                state: ClockState::Running,
                seconds: 3,
                band: None,
            },
        };
        assert_eq!(hud.mines_display(), "?");
        assert_eq!(hud.mine_band(), MineBand::Negative);
    }
}
