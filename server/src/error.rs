use thiserror::Error;

use hintsweeper_common::models::Pos;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("cell {pos} is outside the {width}x{height} board")]
    OutOfBounds { pos: Pos, width: usize, height: usize },
}
