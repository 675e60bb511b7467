use tracing::debug;

use hintsweeper_common::models::Pos;

use super::{Outcome, Session};
use crate::{data::Visibility, error::EngineError};

impl Session {
    /// Put a flag on a hidden cell or take it off again. The counter follows
    /// every toggle and goes negative when there are more flags than mines.
    pub fn toggle_flag(&mut self, pos: Pos) -> Result<Outcome, EngineError> {
        let index = self.index(pos)?;
        let mut outcome = Outcome::default();
        if !self.accepts_input() {
            return Ok(outcome);
        }

        let cell = &mut self.field.cells[index];
        match cell.visibility {
            Visibility::Revealed => return Ok(outcome),
            Visibility::Hidden => {
                cell.visibility = Visibility::Flagged;
                self.mines_left -= 1;
            }
            Visibility::Flagged => {
                cell.visibility = Visibility::Hidden;
                self.mines_left += 1;
            }
        }

        debug!("Flag toggled at {}, {} mines left", pos, self.mines_left);
        outcome.changed.push(pos);
        outcome.hud_changed = true;
        Ok(outcome)
    }
}
