use std::fmt;

pub mod constraint;
pub mod engine;
pub mod game;
pub mod player;
pub mod settings;

pub use constraint::Constraint;
pub use engine::{KnowledgeEngine, KnowledgeError};
pub use game::{Cell, Game, GameState, Reveal};
pub use player::{Player, Step};
pub use settings::Settings;

/// Represents a 2D coordinate on the minesweeper board.
/// `x` is the column and `y` is the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    /// All valid neighbor coordinates on a `width` x `height` board.
    /// It correctly handles board edges and corners.
    pub fn neighbors(self, width: usize, height: usize) -> impl Iterator<Item = Point> {
        // Define potential neighbor offsets (from -1 to 1 in both x and y)
        (-1..=1).flat_map(move |dy| {
            (-1..=1).filter_map(move |dx| {
                // Skip the center point itself (dx=0, dy=0)
                if dx == 0 && dy == 0 {
                    return None;
                }

                let nx = self.x as isize + dx;
                let ny = self.y as isize + dy;

                if nx >= 0 && nx < width as isize && ny >= 0 && ny < height as isize {
                    Some(Point {
                        x: nx as usize,
                        y: ny as usize,
                    })
                } else {
                    None
                }
            })
        })
    }

    pub fn in_bounds(self, width: usize, height: usize) -> bool {
        self.x < width && self.y < height
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors() {
        // Corner cell (0,0) should have 3 neighbors
        assert_eq!(Point { x: 0, y: 0 }.neighbors(3, 3).count(), 3);

        // Center cell (1,1) should have 8 neighbors
        assert_eq!(Point { x: 1, y: 1 }.neighbors(3, 3).count(), 8);

        // Edge cell (1,0) should have 5 neighbors
        assert_eq!(Point { x: 1, y: 0 }.neighbors(3, 3).count(), 5);

        // A single row only has horizontal neighbors
        let row: Vec<Point> = Point { x: 1, y: 0 }.neighbors(3, 1).collect();
        assert_eq!(row, vec![Point { x: 0, y: 0 }, Point { x: 2, y: 0 }]);
    }

    #[test]
    fn test_in_bounds() {
        assert!(Point { x: 2, y: 0 }.in_bounds(3, 1));
        assert!(!Point { x: 3, y: 0 }.in_bounds(3, 1));
        assert!(!Point { x: 0, y: 1 }.in_bounds(3, 1));
    }
}
