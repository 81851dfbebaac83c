use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

use crate::error::Result;
use crate::models::{decode_numbers, encode_numbers, validate_draw, Draw, Game};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lotto649_results (
    draw_number       INTEGER PRIMARY KEY,
    draw_date         TEXT NOT NULL,
    numbers           TEXT NOT NULL,
    bonus_number      INTEGER NOT NULL,
    jackpot_amount    INTEGER NOT NULL DEFAULT 0,
    created_at        TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS lottomax_results (
    draw_number       INTEGER PRIMARY KEY,
    draw_date         TEXT NOT NULL,
    numbers           TEXT NOT NULL,
    bonus_number      INTEGER NOT NULL,
    jackpot_amount    INTEGER NOT NULL DEFAULT 0,
    maxmillions_count INTEGER NOT NULL DEFAULT 0,
    created_at        TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_lotto649_date ON lotto649_results (draw_date);
CREATE INDEX IF NOT EXISTS idx_lottomax_date ON lottomax_results (draw_date);
";

/// Outcome of an upsert keyed on `draw_number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lottoscan.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

// Lotto 6/49 rows have no MaxMillions column; select a constant so both
// tables map onto the same row shape.
fn maxmillions_column(game: Game) -> &'static str {
    if game.has_maxmillions() {
        "maxmillions_count"
    } else {
        "0"
    }
}

pub fn upsert_draw(conn: &Connection, game: Game, draw: &Draw) -> Result<Upsert> {
    validate_draw(game, draw)?;

    let table = game.table();
    let existing: Option<u32> = conn
        .query_row(
            &format!("SELECT draw_number FROM {table} WHERE draw_number = ?1"),
            [draw.draw_number],
            |row| row.get(0),
        )
        .optional()?;

    let numbers = encode_numbers(&draw.numbers);
    if game.has_maxmillions() {
        conn.execute(
            &format!(
                "INSERT INTO {table} (draw_number, draw_date, numbers, bonus_number, jackpot_amount, maxmillions_count)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(draw_number) DO UPDATE SET
                    draw_date = excluded.draw_date,
                    numbers = excluded.numbers,
                    bonus_number = excluded.bonus_number,
                    jackpot_amount = excluded.jackpot_amount,
                    maxmillions_count = excluded.maxmillions_count"
            ),
            rusqlite::params![
                draw.draw_number,
                draw.draw_date,
                numbers,
                draw.bonus_number,
                draw.jackpot_amount,
                draw.maxmillions_count,
            ],
        )?;
    } else {
        conn.execute(
            &format!(
                "INSERT INTO {table} (draw_number, draw_date, numbers, bonus_number, jackpot_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(draw_number) DO UPDATE SET
                    draw_date = excluded.draw_date,
                    numbers = excluded.numbers,
                    bonus_number = excluded.bonus_number,
                    jackpot_amount = excluded.jackpot_amount"
            ),
            rusqlite::params![
                draw.draw_number,
                draw.draw_date,
                numbers,
                draw.bonus_number,
                draw.jackpot_amount,
            ],
        )?;
    }

    Ok(match existing {
        Some(_) => Upsert::Replaced,
        None => Upsert::Inserted,
    })
}

fn row_to_draw(row: &rusqlite::Row<'_>) -> rusqlite::Result<Draw> {
    let raw_numbers: String = row.get(2)?;
    let numbers = decode_numbers(&raw_numbers)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
    Ok(Draw {
        draw_number: row.get(0)?,
        draw_date: row.get(1)?,
        numbers,
        bonus_number: row.get(3)?,
        jackpot_amount: row.get(4)?,
        maxmillions_count: row.get(5)?,
    })
}

/// All draws of a game, oldest first.
pub fn fetch_all(conn: &Connection, game: Game) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT draw_number, draw_date, numbers, bonus_number, jackpot_amount, {}
         FROM {} ORDER BY draw_date ASC, draw_number ASC",
        maxmillions_column(game),
        game.table()
    ))?;
    let draws = stmt
        .query_map([], row_to_draw)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(draws)
}

pub fn fetch_last_draws(conn: &Connection, game: Game, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT draw_number, draw_date, numbers, bonus_number, jackpot_amount, {}
         FROM {} ORDER BY draw_date DESC, draw_number DESC LIMIT ?1",
        maxmillions_column(game),
        game.table()
    ))?;
    let draws = stmt
        .query_map([limit], row_to_draw)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection, game: Game) -> Result<u32> {
    let count: u32 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {}", game.table()),
        [],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Deletes every draw of `game`. Returns the number of rows removed.
pub fn reset(conn: &Connection, game: Game) -> Result<usize> {
    let removed = conn.execute(&format!("DELETE FROM {}", game.table()), [])?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LottoError;
    use chrono::NaiveDate;

    fn test_draw(number: u32, date: &str, numbers: Vec<u8>) -> Draw {
        Draw {
            draw_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            draw_number: number,
            numbers,
            bonus_number: 40,
            jackpot_amount: 12_000_000,
            maxmillions_count: 0,
        }
    }

    fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = memory_db();
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 0);

        let outcome = upsert_draw(&conn, Game::Lotto649, &test_draw(1, "2024-01-03", vec![1, 2, 3, 4, 5, 6])).unwrap();
        assert_eq!(outcome, Upsert::Inserted);
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 1);
        assert_eq!(count_draws(&conn, Game::LottoMax).unwrap(), 0);
    }

    #[test]
    fn test_upsert_replaces_same_draw_number() {
        let conn = memory_db();
        upsert_draw(&conn, Game::Lotto649, &test_draw(7, "2024-01-03", vec![1, 2, 3, 4, 5, 6])).unwrap();
        let outcome = upsert_draw(&conn, Game::Lotto649, &test_draw(7, "2024-01-03", vec![11, 12, 13, 14, 15, 16])).unwrap();
        assert_eq!(outcome, Upsert::Replaced);

        let draws = fetch_all(&conn, Game::Lotto649).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].numbers, vec![11, 12, 13, 14, 15, 16]);
    }

    #[test]
    fn test_invalid_draw_leaves_store_unchanged() {
        let conn = memory_db();
        upsert_draw(&conn, Game::Lotto649, &test_draw(1, "2024-01-03", vec![1, 2, 3, 4, 5, 6])).unwrap();

        let err = upsert_draw(&conn, Game::Lotto649, &test_draw(2, "2024-01-06", vec![1, 1, 3, 4, 5, 6])).unwrap_err();
        assert!(matches!(err, LottoError::Validation(_)));
        // a bad replacement must not clobber the stored row either
        assert!(upsert_draw(&conn, Game::Lotto649, &test_draw(1, "2024-01-03", vec![1, 2, 3, 4, 5, 99])).is_err());

        let draws = fetch_all(&conn, Game::Lotto649).unwrap();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].numbers, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_fetch_all_ordered_by_date() {
        let conn = memory_db();
        upsert_draw(&conn, Game::Lotto649, &test_draw(1, "2024-01-03", vec![1, 2, 3, 4, 5, 6])).unwrap();
        upsert_draw(&conn, Game::Lotto649, &test_draw(3, "2024-01-10", vec![1, 2, 3, 4, 5, 6])).unwrap();
        upsert_draw(&conn, Game::Lotto649, &test_draw(2, "2024-01-06", vec![1, 2, 3, 4, 5, 6])).unwrap();

        let draws = fetch_all(&conn, Game::Lotto649).unwrap();
        let numbers: Vec<u32> = draws.iter().map(|d| d.draw_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(draws.windows(2).all(|w| w[0].draw_date <= w[1].draw_date));

        let last = fetch_last_draws(&conn, Game::Lotto649, 2).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(last[0].draw_number, 3);
        assert_eq!(last[1].draw_number, 2);
    }

    #[test]
    fn test_fetch_all_empty() {
        let conn = memory_db();
        assert!(fetch_all(&conn, Game::LottoMax).unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let conn = memory_db();
        let draw = Draw {
            draw_date: NaiveDate::from_ymd_opt(2023, 11, 17).unwrap(),
            draw_number: 1130,
            numbers: vec![44, 3, 27, 9, 50, 12, 31],
            bonus_number: 27,
            jackpot_amount: 70_000_000,
            maxmillions_count: 8,
        };
        upsert_draw(&conn, Game::LottoMax, &draw).unwrap();

        let stored = fetch_all(&conn, Game::LottoMax).unwrap();
        assert_eq!(stored, vec![draw]);
    }

    #[test]
    fn test_reset_clears_one_game() {
        let conn = memory_db();
        upsert_draw(&conn, Game::Lotto649, &test_draw(1, "2024-01-03", vec![1, 2, 3, 4, 5, 6])).unwrap();
        upsert_draw(&conn, Game::Lotto649, &test_draw(2, "2024-01-06", vec![1, 2, 3, 4, 5, 6])).unwrap();
        upsert_draw(&conn, Game::LottoMax, &test_draw(1, "2024-01-02", vec![1, 2, 3, 4, 5, 6, 7])).unwrap();

        assert_eq!(reset(&conn, Game::Lotto649).unwrap(), 2);
        assert_eq!(count_draws(&conn, Game::Lotto649).unwrap(), 0);
        assert_eq!(count_draws(&conn, Game::LottoMax).unwrap(), 1);
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = memory_db();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn, Game::LottoMax).unwrap(), 0);
    }
}
