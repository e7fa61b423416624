use std::collections::BTreeSet;
use std::fmt;

use rand::Rng;
use rand::seq::IteratorRandom;

use crate::Point;

/// The visible state of a single cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Cell {
    Hidden,
    Flagged,
    Revealed(u8), // The u8 is the number of adjacent mines.
}

/// Represents the current state of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum GameState {
    Playing,
    Won,
    Lost,
}

/// What the board answers when a cell is revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reveal {
    Mine,
    Count(u8),
}

/// The ground truth of a game: where the mines are and what has been uncovered.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Game {
    pub width: usize,
    pub height: usize,
    mines: BTreeSet<Point>,
    /// The visible state of the board, indexed `board[y][x]`.
    pub board: Vec<Vec<Cell>>,
    pub game_state: GameState,
}

impl Game {
    /// Creates a board with `total_mines` mines placed uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        total_mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if total_mines >= width * height {
            anyhow::bail!("total mines must be less than the number of cells on the board");
        }
        let mines = (0..height)
            .flat_map(|y| (0..width).map(move |x| Point { x, y }))
            .choose_multiple(rng, total_mines);
        Self::with_mines(height, width, mines)
    }

    /// Creates a board with mines at exactly the given points.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Point>,
    ) -> anyhow::Result<Self> {
        let mines: BTreeSet<Point> = mines.into_iter().collect();
        if let Some(outside) = mines.iter().find(|p| !p.in_bounds(width, height)) {
            anyhow::bail!("mine {outside} is outside the {width}x{height} board");
        }
        if mines.len() >= width * height {
            anyhow::bail!("total mines must be less than the number of cells on the board");
        }
        Ok(Game {
            width,
            height,
            mines,
            board: vec![vec![Cell::Hidden; width]; height],
            game_state: GameState::Playing,
        })
    }

    /// Deserializes a game state from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the game state to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn total_mines(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, point: Point) -> bool {
        self.mines.contains(&point)
    }

    /// Number of mines within one row and column of `point`, not counting itself.
    pub fn nearby_mines(&self, point: Point) -> u8 {
        self.neighbors(point).filter(|n| self.is_mine(*n)).count() as u8
    }

    pub fn neighbors(&self, point: Point) -> impl Iterator<Item = Point> {
        point.neighbors(self.width, self.height)
    }

    /// Uncovers a cell.
    ///
    /// Hitting a mine ends the game. Uncovering the last safe cell wins it.
    /// Revealing a cell twice returns the same count without changing anything.
    /// Flagged cells can't be uncovered.
    pub fn reveal_cell(&mut self, at: Point) -> anyhow::Result<Reveal> {
        if !at.in_bounds(self.width, self.height) {
            anyhow::bail!("out_of_bounds");
        }
        match self.board[at.y][at.x] {
            Cell::Revealed(count) => return Ok(Reveal::Count(count)),
            Cell::Flagged => anyhow::bail!("flagged"),
            Cell::Hidden => {}
        }
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        if self.is_mine(at) {
            self.game_state = GameState::Lost;
            return Ok(Reveal::Mine);
        }

        let count = self.nearby_mines(at);
        self.board[at.y][at.x] = Cell::Revealed(count);

        if self.all_safe_cells_revealed() {
            self.game_state = GameState::Won;
        }

        Ok(Reveal::Count(count))
    }

    /// Plants a flag on a hidden cell. Revealed cells can't be flagged.
    pub fn flag(&mut self, at: Point) -> anyhow::Result<()> {
        if !at.in_bounds(self.width, self.height) {
            anyhow::bail!("out_of_bounds");
        }
        if let Cell::Revealed(_) = self.board[at.y][at.x] {
            anyhow::bail!("already_revealed");
        }
        if self.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }
        self.board[at.y][at.x] = Cell::Flagged;
        if self.won() {
            self.game_state = GameState::Won;
        }
        Ok(())
    }

    pub fn flags(&self) -> BTreeSet<Point> {
        self.points()
            .filter(|p| self.board[p.y][p.x] == Cell::Flagged)
            .collect()
    }

    /// The game is won when the flags sit exactly on the mines, or when every
    /// safe cell has been uncovered. A board without mines needs uncovering.
    pub fn won(&self) -> bool {
        let all_flagged = !self.mines.is_empty() && self.flags() == self.mines;
        self.game_state != GameState::Lost && (all_flagged || self.all_safe_cells_revealed())
    }

    fn all_safe_cells_revealed(&self) -> bool {
        let revealed = self
            .board
            .iter()
            .flatten()
            .filter(|c| matches!(c, Cell::Revealed(_)))
            .count();
        revealed == self.width * self.height - self.mines.len()
    }

    fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point { x, y }))
    }
}

/// Text rendering of the visible board, with a header of column numbers.
impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..self.width {
            write!(f, "{:^3}", x)?;
        }
        writeln!(f, "\n  +{}", "---".repeat(self.width))?;

        for (y, row) in self.board.iter().enumerate() {
            write!(f, "{:^2}|", y)?;
            for cell in row {
                match cell {
                    Cell::Hidden => write!(f, " ■ ")?,
                    Cell::Flagged => write!(f, " F ")?,
                    Cell::Revealed(n) => write!(f, " {} ", n)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
