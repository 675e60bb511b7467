//! One game from first click to result: the board, what the player has
//! uncovered or flagged, the clock and the hint ledger.
//!
//! All operations are synchronous and run to completion; the caller owns the
//! session and serialises access to it.

mod flag;
mod hint;
mod reveal;

use rand::Rng;
use tracing::{debug, info};

use hintsweeper_common::{
    models::{self, ClockState, GameStatus, Hud, Pos, TimerView},
    params::GameParams,
};

use super::clock::{Clock, Tick};
use crate::{
    data::{Cell, Content, Field, Visibility},
    error::EngineError,
};

pub use hint::{BIG_HINT_PENALTY, SMALL_HINT_PENALTY};

/// What an operation changed, for the caller to publish.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Cells whose view changed.
    pub changed: Vec<Pos>,
    /// Counters, clock or hint availability changed.
    pub hud_changed: bool,
    /// This operation ended the game.
    pub finished: bool,
}

impl Outcome {
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty() && !self.hud_changed && !self.finished
    }
}

/// Facts about a finished session, ready to become a scoreboard entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedGame {
    pub win: bool,
    pub params: GameParams,
    pub correct_flags: usize,
    pub duration: u32,
    pub hints: u32,
    pub penalty: u32,
}

#[derive(Debug)]
pub struct Session {
    params: GameParams,
    field: Field,
    clock: Clock,
    status: GameStatus,
    mines_left: i64,
    hints: u32,
    penalty: u32,
    large_hint_available: bool,
}

impl Session {
    /// Start a session. A timed session starts its countdown right away and
    /// comes with one free big hint.
    pub fn new<R: Rng + ?Sized>(params: GameParams, countdown_seconds: u32, rng: &mut R) -> Self {
        let params = params.clamped();
        let field = Field::generate(params, rng);
        let clock = if params.timed {
            Clock::countdown(countdown_seconds)
        } else {
            Clock::count_up()
        };

        let mut session = Self {
            params,
            field,
            clock,
            status: GameStatus::InProgress,
            mines_left: params.mines as i64,
            hints: 0,
            penalty: 0,
            large_hint_available: false,
        };

        if params.timed {
            session.free_big_hint(rng);
        }
        session.reassess_large_hint();

        info!(
            "New session: {}x{} with {} mines ({})",
            params.width,
            params.height,
            params.mines,
            if params.timed { "timed" } else { "untimed" }
        );
        session
    }

    pub fn params(&self) -> GameParams {
        self.params
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn mines_left(&self) -> i64 {
        self.mines_left
    }

    pub fn revealed(&self) -> usize {
        self.field.revealed
    }

    pub fn hints(&self) -> u32 {
        self.hints
    }

    pub fn penalty(&self) -> u32 {
        self.penalty
    }

    pub fn large_hint_available(&self) -> bool {
        self.large_hint_available
    }

    pub fn hud(&self) -> Hud {
        Hud {
            mines_left: self.mines_left,
            mines_total: self.params.mines,
            large_hint_available: self.large_hint_available,
            hints: self.hints,
            penalty_seconds: self.penalty,
            paused: self.clock.state() == ClockState::Paused,
            timer: self.timer_view(),
        }
    }

    pub fn timer_view(&self) -> TimerView {
        self.clock.view(self.penalty)
    }

    /// What a player sees at `pos`. While paused every cell is blank.
    pub fn cell_view(&self, pos: Pos) -> Option<models::Cell> {
        let cell = self.field.get(pos)?;
        Some(if self.paused() {
            BLANK
        } else {
            view(cell, self.status.is_over())
        })
    }

    pub fn field_view(&self) -> Vec<Vec<models::Cell>> {
        let over = self.status.is_over();
        let paused = self.paused();
        self.field
            .cells
            .chunks(self.field.width)
            .map(|row| {
                row.iter()
                    .map(|cell| if paused { BLANK } else { view(cell, over) })
                    .collect()
            })
            .collect()
    }

    /// Mines that carry a flag.
    pub fn correct_flags(&self) -> usize {
        self.field
            .cells
            .iter()
            .filter(|cell| cell.visibility == Visibility::Flagged && cell.is_mine())
            .count()
    }

    pub fn finished_game(&self) -> Option<FinishedGame> {
        let win = match self.status {
            GameStatus::InProgress => return None,
            GameStatus::Won => true,
            GameStatus::Lost => false,
        };
        Some(FinishedGame {
            win,
            params: self.params,
            correct_flags: self.correct_flags(),
            duration: self.clock.elapsed(),
            hints: self.hints,
            penalty: self.penalty,
        })
    }

    /// One second of wall time.
    pub fn tick(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        match self.clock.tick() {
            Tick::Ignored => {}
            Tick::Counted => outcome.hud_changed = true,
            Tick::Expired => {
                info!("Countdown expired after {}s", self.clock.elapsed());
                self.finish(GameStatus::Lost, &mut outcome);
            }
        }
        outcome
    }

    pub fn pause(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        if !self.status.is_over() && self.clock.pause() {
            debug!("Session paused at {}s", self.clock.elapsed());
            outcome.changed = self.marked_positions();
            outcome.hud_changed = true;
        }
        outcome
    }

    pub fn resume(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        if !self.status.is_over() && self.clock.resume() {
            debug!("Session resumed at {}s", self.clock.elapsed());
            outcome.changed = self.marked_positions();
            outcome.hud_changed = true;
        }
        outcome
    }

    fn paused(&self) -> bool {
        self.clock.state() == ClockState::Paused
    }

    /// Cells that look different from a blank one in play: the ones a pause
    /// hides and a resume shows again.
    fn marked_positions(&self) -> Vec<Pos> {
        self.field
            .positions()
            .filter(|pos| {
                self.field
                    .get(*pos)
                    .is_some_and(|cell| view(cell, false) != BLANK)
            })
            .collect()
    }

    fn index(&self, pos: Pos) -> Result<usize, EngineError> {
        self.field.index(pos).ok_or(EngineError::OutOfBounds {
            pos,
            width: self.field.width,
            height: self.field.height,
        })
    }

    /// Player input is dropped once the game is over and while paused.
    fn accepts_input(&self) -> bool {
        !self.status.is_over() && self.clock.state() != ClockState::Paused
    }

    fn finish(&mut self, status: GameStatus, outcome: &mut Outcome) {
        self.status = status;
        self.clock.stop();
        self.large_hint_available = false;
        outcome.finished = true;
        outcome.hud_changed = true;

        let positions: Vec<Pos> = self.field.positions().collect();
        for pos in positions {
            let Some(cell) = self.field.get_mut(pos) else {
                continue;
            };
            let shows_more = match cell.visibility {
                Visibility::Revealed => false,
                Visibility::Flagged => true,
                Visibility::Hidden => cell.is_mine() || cell.hinted,
            };
            cell.hinted = false;
            if cell.visibility == Visibility::Flagged && !cell.is_mine() {
                // A wrong flag no longer counts against the mines.
                self.mines_left += 1;
            }
            if shows_more {
                outcome.changed.push(pos);
            }
        }

        info!(
            "Session {} after {}s: {} of {} mines flagged, {} hints",
            if status == GameStatus::Won { "won" } else { "lost" },
            self.clock.elapsed(),
            self.correct_flags(),
            self.params.mines,
            self.hints
        );
    }
}

const BLANK: models::Cell = models::Cell::Hidden { hinted: false };

fn view(cell: &Cell, over: bool) -> models::Cell {
    match (cell.visibility, cell.content) {
        (Visibility::Revealed, Content::Mine) if cell.exploded => models::Cell::Exploded,
        (Visibility::Revealed, Content::Mine) => models::Cell::Mine,
        (Visibility::Revealed, Content::Empty) => models::Cell::Revealed { adjacent: 0 },
        (Visibility::Revealed, Content::Digit(adjacent)) => models::Cell::Revealed { adjacent },
        (Visibility::Flagged, Content::Mine) if over => models::Cell::CorrectFlag,
        (Visibility::Flagged, _) if over => models::Cell::WrongFlag,
        (Visibility::Flagged, _) => models::Cell::Flagged,
        (Visibility::Hidden, Content::Mine) if over => models::Cell::Mine,
        (Visibility::Hidden, _) => models::Cell::Hidden {
            hinted: cell.hinted,
        },
    }
}
