use minesweeper as ms;
use wasm_bindgen::prelude::*;

fn load(bts: &[u8]) -> Result<ms::Player, String> {
    ms::Player::deserialize(bts).map_err(|e| e.to_string())
}

fn store(player: &ms::Player) -> Result<Vec<u8>, String> {
    player.serialize().map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn create_game(height: u8, width: u8, mines: u8) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut rng = rand::rng();
    let game = ms::Game::new(height as usize, width as usize, mines as usize, &mut rng)
        .map_err(|e| e.to_string())?;
    store(&ms::Player::new(game))
}

#[wasm_bindgen]
pub fn validate(bts: Vec<u8>) -> Result<bool, String> {
    console_error_panic_hook::set_once();

    let player = load(&bts)?;
    Ok(player.game.won())
}

/// Reveals a cell picked by the user. The last byte of the result is 1 if it was a mine.
#[wasm_bindgen]
pub fn choose_cell(bts: Vec<u8>, x: usize, y: usize) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    let reveal = player
        .reveal(ms::Point { x, y })
        .map_err(|e| e.to_string())?;
    let mut xs = store(&player)?;
    xs.push(if reveal == ms::Reveal::Mine { 1 } else { 0 });
    Ok(xs)
}

/// Lets the bot play one move. The last byte of the result is 1 if it hit a mine,
/// 2 if it had nothing left to play.
#[wasm_bindgen]
pub fn ai_move(bts: Vec<u8>) -> Result<Vec<u8>, String> {
    console_error_panic_hook::set_once();

    let mut player = load(&bts)?;
    let step = player
        .step(&mut rand::rng())
        .map_err(|e| e.to_string())?;
    let mut xs = store(&player)?;
    xs.push(match step {
        ms::Step::Safe(_) | ms::Step::Guess(_) => 0,
        ms::Step::Exploded(_) => 1,
        ms::Step::Stuck => 2,
    });
    Ok(xs)
}

/// Row-major cells: -1 hidden, -2 flagged, otherwise the revealed count.
#[wasm_bindgen]
pub fn get_cells(bts: Vec<u8>) -> Result<Vec<i8>, String> {
    console_error_panic_hook::set_once();

    let player = load(&bts)?;
    Ok(player
        .game
        .board
        .into_iter()
        .flat_map(|row| {
            row.into_iter().map(|cell| match cell {
                ms::Cell::Hidden => -1,
                ms::Cell::Flagged => -2,
                ms::Cell::Revealed(n) => n as i8,
            })
        })
        .collect())
}
