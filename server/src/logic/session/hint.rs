use rand::{Rng, seq::IndexedRandom};
use tracing::{debug, info};

use hintsweeper_common::models::{GameStatus, Pos};

use super::{Outcome, Session};
use crate::data::{Content, Visibility};

/// Seconds charged for highlighting an empty cell.
pub const BIG_HINT_PENALTY: u32 = 30;
/// Seconds charged for highlighting a digit cell.
pub const SMALL_HINT_PENALTY: u32 = 10;

impl Session {
    /// Highlight a random safe hidden cell: an empty one for a big hint, a
    /// digit for a small one. A flag does not hide a cell from hints. The penalty is charged even when no cell
    /// qualifies, and in countdown mode it can run the clock out.
    pub fn hint<R: Rng + ?Sized>(&mut self, big: bool, rng: &mut R) -> Outcome {
        let mut outcome = Outcome::default();
        if !self.accepts_input() {
            return outcome;
        }

        let penalty = if big {
            BIG_HINT_PENALTY
        } else {
            SMALL_HINT_PENALTY
        };
        self.hints += 1;
        self.penalty += penalty;
        outcome.hud_changed = true;

        if let Some(pos) = self.highlight(big, rng) {
            outcome.changed.push(pos);
        }

        if self.clock.charge(penalty) {
            info!("Hint penalty of {}s used up the countdown", penalty);
            self.finish(GameStatus::Lost, &mut outcome);
        }
        outcome
    }

    /// The complimentary big hint of a timed session.
    pub(super) fn free_big_hint<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(pos) = self.highlight(true, rng) {
            debug!("Free big hint at {}", pos);
        }
    }

    /// Big hints stay on offer while an empty cell is still hidden.
    pub(super) fn reassess_large_hint(&mut self) {
        self.large_hint_available = !self.candidates(true).is_empty();
    }

    fn highlight<R: Rng + ?Sized>(&mut self, big: bool, rng: &mut R) -> Option<Pos> {
        let pos = *self.candidates(big).choose(rng)?;
        if let Some(cell) = self.field.get_mut(pos) {
            cell.hinted = true;
        }
        debug!("{} hint highlights {}", if big { "Big" } else { "Small" }, pos);
        Some(pos)
    }

    fn candidates(&self, big: bool) -> Vec<Pos> {
        self.field
            .positions()
            .filter(|pos| {
                self.field.get(*pos).is_some_and(|cell| {
                    cell.visibility != Visibility::Revealed
                        && match cell.content {
                            Content::Mine => false,
                            Content::Empty => big,
                            Content::Digit(_) => !big,
                        }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{pos, session_from};
    use super::*;
    use hintsweeper_common::models::{Cell, ClockState};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // (4,4) is the only empty cell; the rest of the safe cells are digits.
    const BOARD: [&str; 5] = ["#.#.#", ".....", "#.#.#", ".....", "#.#.."];

    fn hinted(session: &Session) -> Vec<Pos> {
        session
            .field
            .positions()
            .filter(|p| matches!(session.cell_view(*p), Some(Cell::Hidden { hinted: true })))
            .collect()
    }

    #[test]
    fn big_hint_picks_an_empty_cell() {
        let mut session = session_from(&BOARD, false);
        let mut rng = StdRng::seed_from_u64(3);
        let outcome = session.hint(true, &mut rng);

        assert_eq!(outcome.changed, vec![pos(4, 4)]);
        assert_eq!(hinted(&session), vec![pos(4, 4)]);
        assert_eq!(session.hints(), 1);
        assert_eq!(session.penalty(), BIG_HINT_PENALTY);
        assert_eq!(session.hud().timer.seconds, 30);
    }

    #[test]
    fn small_hint_picks_a_digit_cell() {
        let mut session = session_from(&BOARD, false);
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..5 {
            let outcome = session.hint(false, &mut rng);
            let picked = outcome.changed[0];
            assert!(matches!(
                session.field.get(picked).map(|cell| cell.content),
                Some(Content::Digit(_))
            ));
        }
        assert_eq!(session.hints(), 5);
        assert_eq!(session.penalty(), 5 * SMALL_HINT_PENALTY);
    }

    #[test]
    fn penalty_is_charged_without_candidates() {
        let mut session = session_from(&BOARD, false);
        session.reveal(pos(4, 4)).unwrap();
        assert!(!session.large_hint_available());

        let outcome = session.hint(true, &mut StdRng::seed_from_u64(1));
        assert!(outcome.changed.is_empty());
        assert!(outcome.hud_changed);
        assert_eq!(session.penalty(), BIG_HINT_PENALTY);
    }

    #[test]
    fn countdown_penalties_leave_twenty_seconds() {
        let mut session = session_from(&BOARD, true);
        let mut rng = StdRng::seed_from_u64(4);
        session.hint(true, &mut rng);
        session.hint(false, &mut rng);

        assert_eq!(session.clock().remaining(), Some(20));
        assert_eq!(session.clock().elapsed(), 0);
        assert_eq!(session.penalty(), 40);
        assert_eq!(session.hud().timer.seconds, 20);
    }

    #[test]
    fn penalty_that_exhausts_the_countdown_loses() {
        let mut session = session_from(&BOARD, true);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(!session.hint(true, &mut rng).finished);
        let outcome = session.hint(true, &mut rng);

        assert!(outcome.finished);
        assert_eq!(session.status(), GameStatus::Lost);
        assert_eq!(session.clock().state(), ClockState::Expired);
        assert!(hinted(&session).is_empty());
    }

    #[test]
    fn hints_are_ignored_after_the_game() {
        let mut session = session_from(&BOARD, false);
        session.reveal(pos(0, 0)).unwrap();
        assert!(session.hint(false, &mut StdRng::seed_from_u64(2)).is_noop());
        assert_eq!(session.hints(), 0);
    }

    #[test]
    fn flagged_empty_cell_still_takes_a_big_hint() {
        let mut session = session_from(&BOARD, false);
        session.toggle_flag(pos(4, 4)).unwrap();
        session.reveal(pos(1, 0)).unwrap();
        assert!(session.large_hint_available());

        let outcome = session.hint(true, &mut StdRng::seed_from_u64(6));
        assert_eq!(outcome.changed, vec![pos(4, 4)]);
        assert_eq!(session.cell_view(pos(4, 4)), Some(Cell::Flagged));

        // The highlight shows once the flag comes off.
        session.toggle_flag(pos(4, 4)).unwrap();
        assert_eq!(hinted(&session), vec![pos(4, 4)]);
    }

    #[test]
    fn reveal_clears_the_highlight() {
        let mut session = session_from(&BOARD, false);
        session.hint(true, &mut StdRng::seed_from_u64(5));
        session.reveal(pos(4, 4)).unwrap();
        assert!(hinted(&session).is_empty());
        assert_eq!(session.cell_view(pos(4, 4)), Some(Cell::Revealed { adjacent: 0 }));
    }
}
