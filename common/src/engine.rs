use std::collections::BTreeSet;

use itertools::Itertools;
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::{Constraint, Point};

/// Reasons an observation is refused. The engine is left untouched when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("invalid cell {cell}: {reason}")]
    InvalidCell { cell: Point, reason: &'static str },
    #[error("invalid count {count} at {cell}: expected between {min} and {max}")]
    InvalidCount {
        cell: Point,
        count: usize,
        min: usize,
        max: usize,
    },
}

/// The player's knowledge of one game.
///
/// Every revealed cell adds a [`Constraint`] over its unresolved neighbors, after which
/// the engine closes the knowledge base under two rules:
/// 1. A constraint whose count is zero (or equals its size) resolves all of its cells.
/// 2. If one constraint's cells are a subset of another's, their difference is a
///    constraint of its own.
///
/// Confirmed mines and safe cells only ever grow, and the two sets never overlap.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct KnowledgeEngine {
    height: usize,
    width: usize,
    moves_made: BTreeSet<Point>,
    mines: BTreeSet<Point>,
    safes: BTreeSet<Point>,
    /// Constraints known to be true. None of them mention a confirmed cell.
    constraints: Vec<Constraint>,
    last_closure_passes: usize,
}

impl KnowledgeEngine {
    pub fn new(height: usize, width: usize) -> Self {
        KnowledgeEngine {
            height,
            width,
            moves_made: BTreeSet::new(),
            mines: BTreeSet::new(),
            safes: BTreeSet::new(),
            constraints: Vec::new(),
            last_closure_passes: 0,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn mines(&self) -> &BTreeSet<Point> {
        &self.mines
    }

    pub fn safes(&self) -> &BTreeSet<Point> {
        &self.safes
    }

    pub fn moves_made(&self) -> &BTreeSet<Point> {
        &self.moves_made
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// How many passes the most recent closure took to reach its fixed point.
    pub fn last_closure_passes(&self) -> usize {
        self.last_closure_passes
    }

    /// Records that `cell` was revealed with `count` mines around it, then
    /// derives everything that follows.
    ///
    /// Neighbors that are already confirmed mines are taken out of the new
    /// constraint along with their share of `count`.
    ///
    /// # Panics
    ///
    /// If the observations seen so far contradict each other.
    pub fn observe(&mut self, cell: Point, count: usize) -> Result<(), KnowledgeError> {
        // --- 1. Validate before touching anything ---
        if !cell.in_bounds(self.width, self.height) {
            return Err(KnowledgeError::InvalidCell {
                cell,
                reason: "outside the board",
            });
        }
        if self.moves_made.contains(&cell) {
            return Err(KnowledgeError::InvalidCell {
                cell,
                reason: "already revealed",
            });
        }
        if self.mines.contains(&cell) {
            return Err(KnowledgeError::InvalidCell {
                cell,
                reason: "known to be a mine",
            });
        }

        let mut known_mines = 0;
        let mut unresolved = BTreeSet::new();
        for neighbor in cell.neighbors(self.width, self.height) {
            if self.mines.contains(&neighbor) {
                known_mines += 1;
            } else if !self.safes.contains(&neighbor) && !self.moves_made.contains(&neighbor) {
                unresolved.insert(neighbor);
            }
        }

        let invalid_count = KnowledgeError::InvalidCount {
            cell,
            count,
            min: known_mines,
            max: known_mines + unresolved.len(),
        };
        let remaining = count
            .checked_sub(known_mines)
            .ok_or(invalid_count.clone())?;
        let constraint = if unresolved.is_empty() {
            if remaining > 0 {
                return Err(invalid_count);
            }
            None
        } else {
            Some(Constraint::new(unresolved, remaining).ok_or(invalid_count)?)
        };

        // --- 2. Record the move ---
        self.moves_made.insert(cell);
        self.mark_safe(cell);

        // --- 3. Learn from it ---
        if let Some(constraint) = constraint {
            self.constraints.push(constraint);
        }
        self.update_knowledge();

        Ok(())
    }

    /// Confirms `cell` as a mine and removes it from every constraint.
    /// Returns whether the cell was newly confirmed.
    ///
    /// # Panics
    ///
    /// If `cell` is already confirmed safe.
    pub fn mark_mine(&mut self, cell: Point) -> bool {
        assert!(
            !self.safes.contains(&cell),
            "{cell} is confirmed safe and cannot be a mine"
        );
        let added = self.mines.insert(cell);
        for constraint in &mut self.constraints {
            constraint.mark_mine(cell);
        }
        added
    }

    /// Confirms `cell` as safe and removes it from every constraint.
    /// Returns whether the cell was newly confirmed.
    ///
    /// # Panics
    ///
    /// If `cell` is already confirmed as a mine.
    pub fn mark_safe(&mut self, cell: Point) -> bool {
        assert!(
            !self.mines.contains(&cell),
            "{cell} is confirmed as a mine and cannot be safe"
        );
        let added = self.safes.insert(cell);
        for constraint in &mut self.constraints {
            constraint.mark_safe(cell);
        }
        added
    }

    /// Runs both inference rules until a full pass learns nothing new.
    fn update_knowledge(&mut self) {
        self.last_closure_passes = 0;
        let mut changed = true;
        while changed {
            changed = false;
            self.last_closure_passes += 1;

            // Cells resolved outright by a single constraint.
            let mut mines = BTreeSet::new();
            let mut safes = BTreeSet::new();
            for constraint in &self.constraints {
                mines.extend(constraint.known_mines());
                safes.extend(constraint.known_safes());
            }
            for cell in mines {
                changed |= self.mark_mine(cell);
            }
            for cell in safes {
                changed |= self.mark_safe(cell);
            }

            // Resolved constraints say nothing, duplicates say nothing new.
            self.constraints = std::mem::take(&mut self.constraints)
                .into_iter()
                .filter(|constraint| !constraint.is_resolved())
                .unique()
                .collect();

            // Subset subtraction over every ordered pair.
            let mut inferred: Vec<Constraint> = Vec::new();
            for (a, b) in self
                .constraints
                .iter()
                .cartesian_product(self.constraints.iter())
            {
                if a == b {
                    continue;
                }
                if let Some(constraint) = a.subtract(b) {
                    if !self.constraints.contains(&constraint) && !inferred.contains(&constraint)
                    {
                        inferred.push(constraint);
                    }
                }
            }
            if !inferred.is_empty() {
                self.constraints.extend(inferred);
                changed = true;
            }
        }
    }

    /// A cell known to be safe that hasn't been revealed yet, lowest first.
    pub fn next_safe_move(&self) -> Option<Point> {
        self.safes.difference(&self.moves_made).next().copied()
    }

    /// A uniformly chosen cell that is neither revealed nor a known mine.
    pub fn next_random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point> {
        let available: Vec<Point> = self
            .all_cells()
            .filter(|p| !self.moves_made.contains(p) && !self.mines.contains(p))
            .collect();
        available.choose(rng).copied()
    }

    fn all_cells(&self) -> impl Iterator<Item = Point> {
        (0..self.height)
            .cartesian_product(0..self.width)
            .map(|(y, x)| Point { x, y })
    }
}
