use rand::Rng;

use crate::{Game, GameState, KnowledgeEngine, Point, Reveal};

/// What the player did on one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Revealed a cell the engine had proven safe.
    Safe(Point),
    /// Nothing was certain, so a random unknown cell was revealed and it was safe.
    Guess(Point),
    /// The revealed cell was a mine.
    Exploded(Point),
    /// No cell is left to reveal.
    Stuck,
}

/// An autonomous player: a board plus everything learned about it so far.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Player {
    pub game: Game,
    pub engine: KnowledgeEngine,
}

impl Player {
    pub fn new(game: Game) -> Self {
        let engine = KnowledgeEngine::new(game.height, game.width);
        Player { game, engine }
    }

    /// Deserializes a player from bytes.
    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }

    /// Serializes the player, board included, to bytes.
    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    /// Plays one move: a proven-safe cell if there is one, a random guess otherwise.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<Step> {
        if self.game.game_state != GameState::Playing {
            anyhow::bail!("game_ended");
        }

        let (point, guessed) = match self.engine.next_safe_move() {
            Some(point) => (point, false),
            None => match self.engine.next_random_move(rng) {
                Some(point) => (point, true),
                None => return Ok(Step::Stuck),
            },
        };

        self.reveal(point)?;
        if self.game.game_state == GameState::Lost {
            return Ok(Step::Exploded(point));
        }
        Ok(if guessed {
            Step::Guess(point)
        } else {
            Step::Safe(point)
        })
    }

    /// Reveals `point` on the board and tells the engine what was found.
    /// Every newly confirmed mine gets flagged. An already open cell just
    /// reports its count again.
    pub fn reveal(&mut self, point: Point) -> anyhow::Result<Reveal> {
        if self.engine.moves_made().contains(&point) {
            return self.game.reveal_cell(point);
        }
        let reveal = self.game.reveal_cell(point)?;
        if let Reveal::Count(count) = reveal {
            self.engine.observe(point, count as usize)?;
            self.flag_known_mines()?;
        }
        Ok(reveal)
    }

    /// Plays until the game is over or nothing is left to reveal.
    pub fn play<R: Rng + ?Sized>(&mut self, rng: &mut R) -> anyhow::Result<GameState> {
        while self.game.game_state == GameState::Playing {
            if self.step(rng)? == Step::Stuck {
                break;
            }
        }
        Ok(self.game.game_state)
    }

    fn flag_known_mines(&mut self) -> anyhow::Result<()> {
        let flags = self.game.flags();
        for &mine in self.engine.mines().difference(&flags) {
            if self.game.game_state != GameState::Playing {
                break;
            }
            self.game.flag(mine)?;
        }
        Ok(())
    }
}
