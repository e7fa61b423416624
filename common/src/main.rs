use minesweeper::*;
use std::thread;

fn main() -> anyhow::Result<()> {
    // --- 1. Initialization ---
    let settings = Settings::from_args(std::env::args().skip(1))?;
    let mut rng = settings.rng();
    let game = Game::new(settings.height, settings.width, settings.mines, &mut rng)?;
    let mut player = Player::new(game);

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: Reveal cells proven safe, guess randomly otherwise.");
    println!(
        "Board: {}x{} with {} mines",
        settings.width, settings.height, settings.mines
    );
    print!("{}", player.game);
    thread::sleep(settings.delay);

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while player.game.game_state == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        match player.step(&mut rng)? {
            Step::Safe(point) => println!("Logic found a guaranteed safe cell: {point}"),
            Step::Guess(point) => println!("No logically safe move found. Guessed {point}"),
            Step::Exploded(point) => println!("Bot revealed {point}... it was a mine."),
            Step::Stuck => {
                println!("No valid moves left for the bot to make.");
                break;
            }
        }
        println!(
            "Known mines: {}, known safe cells: {}, open constraints: {}",
            player.engine.mines().len(),
            player.engine.safes().len(),
            player.engine.constraints().len()
        );
        print!("{}", player.game);

        thread::sleep(settings.delay);
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");

    match player.game.game_state {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }

    Ok(())
}
