//! Property tests for the knowledge engine, played against random boards.
//!
//! Each engine deduction is cross-checked with a SAT solver: a cell the engine
//! calls a mine must make the observations unsatisfiable when assumed safe,
//! and the other way round.

use std::collections::{BTreeSet, HashMap};

use itertools::Itertools;
use minesweeper::{Game, GameState, KnowledgeEngine, Player, Point, Step};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use varisat::{CnfFormula, ExtendFormula, Lit, Solver, Var};

/// A board of up to 5x5 with roughly one mine in five cells, plus a seed for play order.
fn board() -> impl Strategy<Value = (Game, u64)> {
    (1usize..=5, 1usize..=5)
        .prop_flat_map(|(height, width)| {
            (
                Just(height),
                Just(width),
                prop::collection::vec(prop::bool::weighted(0.2), height * width),
                any::<u64>(),
            )
        })
        .prop_filter("at least one safe cell", |(_, _, layout, _)| {
            layout.iter().any(|&mine| !mine)
        })
        .prop_map(|(height, width, layout, seed)| {
            let mines = layout
                .iter()
                .enumerate()
                .filter(|&(_, &mine)| mine)
                .map(|(i, _)| Point {
                    x: i % width,
                    y: i / width,
                });
            (Game::with_mines(height, width, mines).unwrap(), seed)
        })
}

fn safe_cells(game: &Game) -> Vec<Point> {
    (0..game.height)
        .cartesian_product(0..game.width)
        .map(|(y, x)| Point { x, y })
        .filter(|&p| !game.is_mine(p))
        .collect()
}

/// Checks everything that must hold between any two observations.
fn check_invariants(engine: &KnowledgeEngine, game: &Game) -> Result<(), TestCaseError> {
    prop_assert!(engine.mines().is_disjoint(engine.safes()));
    prop_assert!(engine.moves_made().is_subset(engine.safes()));
    for constraint in engine.constraints() {
        prop_assert!(!constraint.is_resolved());
        prop_assert!(constraint.count() <= constraint.cells().len());
        prop_assert!(constraint.cells().is_disjoint(engine.mines()));
        prop_assert!(constraint.cells().is_disjoint(engine.safes()));
        // Every live constraint is true of the real board.
        let actual = constraint
            .cells()
            .iter()
            .filter(|&&p| game.is_mine(p))
            .count();
        prop_assert_eq!(actual, constraint.count());
    }
    for &mine in engine.mines() {
        prop_assert!(game.is_mine(mine));
    }
    for &safe in engine.safes() {
        prop_assert!(!game.is_mine(safe));
    }
    Ok(())
}

/// Encodes "exactly k of these literals are true" with the naive combination encoding.
fn encode_exactly_k(formula: &mut CnfFormula, lits: &[Lit], k: usize) {
    if k > lits.len() {
        formula.add_clause(&[]);
        return;
    }
    // At most k: no k+1 of them can all be true.
    for combo in lits.iter().copied().combinations(k + 1) {
        let clause: Vec<Lit> = combo.iter().map(|&lit| !lit).collect();
        formula.add_clause(&clause);
    }
    // At least k: any n-k+1 of them contain a true one.
    if k > 0 {
        for combo in lits.iter().copied().combinations(lits.len() - k + 1) {
            formula.add_clause(&combo);
        }
    }
}

/// Asks the SAT solver whether each engine deduction follows from the raw observations.
fn assert_entailed(
    engine: &KnowledgeEngine,
    observations: &[(Point, usize)],
) -> Result<(), TestCaseError> {
    let mut solver = Solver::new();
    let mut vars: HashMap<Point, Var> = HashMap::new();
    for y in 0..engine.height() {
        for x in 0..engine.width() {
            vars.insert(Point { x, y }, solver.new_var());
        }
    }
    let mine = |p: &Point| Lit::from_var(vars[p], true);

    let mut formula = CnfFormula::new();
    for (cell, count) in observations {
        formula.add_clause(&[!mine(cell)]);
        let lits: Vec<Lit> = cell
            .neighbors(engine.width(), engine.height())
            .map(|n| mine(&n))
            .collect();
        encode_exactly_k(&mut formula, &lits, *count);
    }
    solver.add_formula(&formula);
    prop_assert!(solver.solve().unwrap());

    for p in engine.mines() {
        solver.assume(&[!mine(p)]);
        prop_assert!(!solver.solve().unwrap(), "{} is not forced to be a mine", p);
    }
    for p in engine.safes() {
        solver.assume(&[mine(p)]);
        prop_assert!(!solver.solve().unwrap(), "{} is not forced to be safe", p);
    }
    solver.assume(&[]);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn deductions_stay_sound_in_any_reveal_order((game, seed) in board()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order = safe_cells(&game);
        order.shuffle(&mut rng);

        let mut engine = KnowledgeEngine::new(game.height, game.width);
        let mut observations = Vec::new();
        let mut mines = BTreeSet::new();
        let mut safes = BTreeSet::new();

        for cell in order {
            let count = game.nearby_mines(cell) as usize;
            engine.observe(cell, count).unwrap();
            observations.push((cell, count));

            check_invariants(&engine, &game)?;
            // Confirmed sets only grow.
            prop_assert!(mines.is_subset(engine.mines()));
            prop_assert!(safes.is_subset(engine.safes()));
            mines = engine.mines().clone();
            safes = engine.safes().clone();

            // Bounded by the subsets of the board.
            prop_assert!(engine.last_closure_passes() <= 1 << (game.height * game.width));
        }

        // Every safe cell has been opened, so nothing proven safe is left.
        prop_assert_eq!(engine.next_safe_move(), None);
        assert_entailed(&engine, &observations)?;
    }

    #[test]
    fn player_only_trips_on_guesses((game, seed) in board()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut player = Player::new(game.clone());

        while player.game.game_state == GameState::Playing {
            let proven = player.engine.next_safe_move();
            let step = player.step(&mut rng).unwrap();
            if let Step::Exploded(point) = step {
                prop_assert_ne!(Some(point), proven);
            }
            if step == Step::Stuck {
                break;
            }
            check_invariants(&player.engine, &game)?;
        }
    }

    #[test]
    fn rejected_observations_change_nothing((game, seed) in board()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut order = safe_cells(&game);
        order.shuffle(&mut rng);
        let Some((&first, rest)) = order.split_first() else {
            return Ok(());
        };

        let mut engine = KnowledgeEngine::new(game.height, game.width);
        engine.observe(first, game.nearby_mines(first) as usize).unwrap();
        let before = engine.clone();

        let mut attempts = vec![
            (first, 0),
            (Point { x: game.width, y: 0 }, 0),
        ];
        if let Some(&next) = rest.first() {
            let slots = next.neighbors(game.width, game.height).count();
            attempts.push((next, slots + 1));
        }
        for (cell, count) in attempts {
            prop_assert!(engine.observe(cell, count).is_err());
            prop_assert_eq!(engine.moves_made(), before.moves_made());
            prop_assert_eq!(engine.safes(), before.safes());
            prop_assert_eq!(engine.mines(), before.mines());
            prop_assert_eq!(engine.constraints(), before.constraints());
        }
    }
}
