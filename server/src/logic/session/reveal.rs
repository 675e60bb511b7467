use std::collections::VecDeque;

use tracing::{debug, warn};

use hintsweeper_common::models::{GameStatus, Pos};

use super::{Outcome, Session};
use crate::{
    data::{Content, Visibility},
    error::EngineError,
};

impl Session {
    /// Uncover a hidden, unflagged cell. Empty cells open up their whole
    /// region through a work queue; a mine ends the game.
    pub fn reveal(&mut self, pos: Pos) -> Result<Outcome, EngineError> {
        let index = self.index(pos)?;
        let mut outcome = Outcome::default();
        if !self.accepts_input() {
            debug!("Ignoring reveal at {}: session not accepting input", pos);
            return Ok(outcome);
        }

        match self.field.cells[index].visibility {
            Visibility::Revealed => return Ok(outcome),
            Visibility::Flagged => {
                debug!("Ignoring reveal on flagged cell {}", pos);
                return Ok(outcome);
            }
            Visibility::Hidden => {}
        }

        self.clock.start();
        self.open(pos, &mut outcome);
        self.after_reveal(&mut outcome);
        Ok(outcome)
    }

    /// Double activation of a revealed digit: when exactly that many
    /// neighbours are flagged, uncover every other hidden neighbour.
    /// Any other case leaves the board untouched.
    pub fn chord(&mut self, pos: Pos) -> Result<Outcome, EngineError> {
        let index = self.index(pos)?;
        let mut outcome = Outcome::default();
        if !self.accepts_input() {
            return Ok(outcome);
        }

        let cell = &self.field.cells[index];
        let Content::Digit(digit) = cell.content else {
            return Ok(outcome);
        };
        if cell.visibility != Visibility::Revealed {
            return Ok(outcome);
        }

        let neighbors: Vec<Pos> = self.field.neighbors(pos).collect();
        let flagged = neighbors
            .iter()
            .filter(|neighbor| self.visibility(**neighbor) == Some(Visibility::Flagged))
            .count();
        if flagged != digit as usize {
            debug!(
                "Chord at {} ignored: {} flags around a {}",
                pos, flagged, digit
            );
            return Ok(outcome);
        }

        for neighbor in neighbors {
            if self.status.is_over() {
                break;
            }
            if self.visibility(neighbor) == Some(Visibility::Hidden) {
                self.open(neighbor, &mut outcome);
            }
        }
        self.after_reveal(&mut outcome);
        Ok(outcome)
    }

    fn visibility(&self, pos: Pos) -> Option<Visibility> {
        self.field.get(pos).map(|cell| cell.visibility)
    }

    /// Flood fill from `start`. Every cell leaves `Hidden` at most once, so
    /// cells queued twice are skipped the second time.
    fn open(&mut self, start: Pos, outcome: &mut Outcome) {
        let mut queue = VecDeque::from([start]);

        while let Some(pos) = queue.pop_front() {
            let content = {
                let Some(cell) = self.field.get_mut(pos) else {
                    continue;
                };
                if cell.visibility != Visibility::Hidden {
                    continue;
                }
                cell.visibility = Visibility::Revealed;
                cell.hinted = false;
                cell.content
            };
            self.field.revealed += 1;
            outcome.changed.push(pos);

            match content {
                Content::Mine => {
                    warn!("Mine hit at {} - game over", pos);
                    if let Some(cell) = self.field.get_mut(pos) {
                        cell.exploded = true;
                    }
                    self.finish(GameStatus::Lost, outcome);
                    return;
                }
                Content::Empty => {
                    let hidden: Vec<Pos> = self
                        .field
                        .neighbors(pos)
                        .filter(|neighbor| self.visibility(*neighbor) == Some(Visibility::Hidden))
                        .collect();
                    queue.extend(hidden);
                }
                Content::Digit(_) => {}
            }

            if self.field.revealed == self.params.safe_cells()
                && self.status == GameStatus::InProgress
            {
                self.finish(GameStatus::Won, outcome);
                return;
            }
        }
    }

    fn after_reveal(&mut self, outcome: &mut Outcome) {
        if !outcome.changed.is_empty() {
            outcome.hud_changed = true;
        }
        if !self.status.is_over() {
            self.reassess_large_hint();
        }
        debug!(
            "Revealed {} cells, {} of {} safe cells open",
            outcome.changed.len(),
            self.field.revealed,
            self.params.safe_cells()
        );
    }
}
