pub mod frequency;
pub mod generator;

use rand::rngs::StdRng;

use lottoscan_db::db::fetch_all;
use lottoscan_db::error::Result;
use lottoscan_db::models::{Entry, Game};
use lottoscan_db::rusqlite::Connection;

use self::frequency::{compute_frequency, FrequencySnapshot};
use self::generator::generate_entries;

pub struct GameAnalysis {
    pub snapshot: FrequencySnapshot,
    pub entries: Vec<Entry>,
}

/// Reads the stored history of `game` and runs the frequency count and the
/// entry strategies over it. `top` defaults to the game's arity.
pub fn analyze_game(conn: &Connection, game: Game, top: Option<usize>, rng: &mut StdRng) -> Result<GameAnalysis> {
    let draws = fetch_all(conn, game)?;
    let snapshot = compute_frequency(&draws, game, top.unwrap_or(game.arity()));
    let entries = generate_entries(&snapshot, game.arity(), rng)?;
    Ok(GameAnalysis { snapshot, entries })
}
