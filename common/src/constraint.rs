use std::collections::BTreeSet;
use std::fmt;

use crate::Point;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// A revealed '2' with three hidden neighbors becomes `{a, b, c} = 2`. As other
/// cells get resolved the statement shrinks, but it never stops being true.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Constraint {
    cells: BTreeSet<Point>,
    count: usize,
}

impl Constraint {
    /// Builds a constraint, returning `None` when `count` exceeds the number of cells.
    pub fn new(cells: impl IntoIterator<Item = Point>, count: usize) -> Option<Self> {
        let cells: BTreeSet<Point> = cells.into_iter().collect();
        (count <= cells.len()).then_some(Constraint { cells, count })
    }

    pub fn cells(&self) -> &BTreeSet<Point> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// A constraint with no cells left carries no information.
    pub fn is_resolved(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every cell is a mine when there are as many mines as cells.
    pub fn known_mines(&self) -> BTreeSet<Point> {
        if self.cells.len() == self.count {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Every cell is safe when the count has dropped to zero.
    pub fn known_safes(&self) -> BTreeSet<Point> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell known to be a mine, taking one mine off the count with it.
    ///
    /// # Panics
    ///
    /// If the cell is present but the count is already zero. That only happens
    /// when the observations fed to the engine contradict each other.
    pub fn mark_mine(&mut self, cell: Point) {
        if self.cells.remove(&cell) {
            self.count = self
                .count
                .checked_sub(1)
                .unwrap_or_else(|| panic!("{cell} marked as a mine in a zero-count constraint"));
        }
    }

    /// Removes a cell known to be safe. The count is untouched.
    ///
    /// # Panics
    ///
    /// If the remaining cells can no longer hold `count` mines.
    pub fn mark_safe(&mut self, cell: Point) {
        if self.cells.remove(&cell) {
            assert!(
                self.count <= self.cells.len(),
                "{cell} marked safe in a constraint that needs it to be a mine"
            );
        }
    }

    /// Subset subtraction: if `other`'s cells all lie inside `self`, the cells
    /// left over hold exactly `self.count - other.count` mines.
    ///
    /// Returns `None` when `other` is not a subset, when nothing is left over,
    /// or when the counts don't fit the leftover cells.
    pub fn subtract(&self, other: &Constraint) -> Option<Constraint> {
        if !other.cells.is_subset(&self.cells) {
            return None;
        }
        let cells: BTreeSet<Point> = self.cells.difference(&other.cells).copied().collect();
        if cells.is_empty() {
            return None;
        }
        let count = self.count.checked_sub(other.count)?;
        Constraint::new(cells, count)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}
