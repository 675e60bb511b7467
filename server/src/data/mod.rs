use hintsweeper_common::models::Pos;

/// Relative positions of the 8 neighbours of a cell.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    Mine,
    /// No mine among the neighbours.
    Empty,
    /// Between 1 and 8 neighbouring mines.
    Digit(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Flagged,
    Revealed,
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub content: Content,
    pub visibility: Visibility,
    pub hinted: bool,
    pub exploded: bool,
}

impl Cell {
    pub fn new(content: Content) -> Self {
        Self {
            content,
            visibility: Visibility::Hidden,
            hinted: false,
            exploded: false,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.content == Content::Mine
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub width: usize,
    pub height: usize,
    pub mines: usize,
    pub revealed: usize,
    /// Row-major.
    pub cells: Vec<Cell>,
}

impl Field {
    pub fn index(&self, pos: Pos) -> Option<usize> {
        (pos.x < self.width && pos.y < self.height).then(|| pos.x + pos.y * self.width)
    }

    pub fn get(&self, pos: Pos) -> Option<&Cell> {
        self.index(pos).map(|index| &self.cells[index])
    }

    pub fn get_mut(&mut self, pos: Pos) -> Option<&mut Cell> {
        self.index(pos).map(|index| &mut self.cells[index])
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
        let (width, height) = (self.width, self.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos { x, y }))
    }

    pub fn neighbors(&self, pos: Pos) -> impl Iterator<Item = Pos> + use<> {
        neighbors(pos, self.width, self.height)
    }
}

/// In-bounds neighbours of `pos`: 3 for a corner, 5 on an edge, 8 inside.
pub fn neighbors(pos: Pos, width: usize, height: usize) -> impl Iterator<Item = Pos> {
    NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        (x < width && y < height).then_some(Pos { x, y })
    })
}
