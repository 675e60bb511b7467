use rand::Rng;
use tracing::debug;

use hintsweeper_common::{models::Pos, params::GameParams};

use crate::data::{Cell, Content, Field, neighbors};

/// Choose mine cells by rejection sampling: draw a random row and column,
/// keep it unless it already holds a mine.
///
/// Terminates because `params.mines < width * height`.
pub fn place_mines<R: Rng + ?Sized>(params: &GameParams, rng: &mut R) -> Vec<bool> {
    let mut mines = vec![false; params.cells()];
    let mut mines_left = params.mines;
    let mut draws = 0usize;

    while mines_left > 0 {
        draws += 1;
        let row = rng.random_range(0..params.height);
        let col = rng.random_range(0..params.width);
        let index = col + row * params.width;
        if !mines[index] {
            mines[index] = true;
            mines_left -= 1;
        }
    }

    debug!(
        "Placed {} mines on {}x{} in {} draws",
        params.mines, params.width, params.height, draws
    );
    mines
}

/// Content of the cell at `index` once the mines are fixed.
pub fn cell_content(mines: &[bool], index: usize, width: usize, height: usize) -> Content {
    if mines[index] {
        return Content::Mine;
    }

    let pos = Pos {
        x: index % width,
        y: index / width,
    };
    let count = neighbors(pos, width, height)
        .filter(|neighbor| mines[neighbor.x + neighbor.y * width])
        .count() as u8;

    match count {
        0 => Content::Empty,
        n => Content::Digit(n),
    }
}

impl Field {
    /// Build a fresh, fully hidden board. Parameters are clamped first.
    pub fn generate<R: Rng + ?Sized>(params: GameParams, rng: &mut R) -> Self {
        let params = params.clamped();
        let mines = place_mines(&params, rng);
        let cells = (0..mines.len())
            .map(|index| Cell::new(cell_content(&mines, index, params.width, params.height)))
            .collect();

        Self {
            width: params.width,
            height: params.height,
            mines: params.mines,
            revealed: 0,
            cells,
        }
    }
}
