use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::Path;

use lottoscan_db::error::LottoError;
use lottoscan_db::models::{Draw, Game};
use lottoscan_db::rusqlite::Connection;

use super::{ingest_draws, IngestReport};

fn parse_record(record: &csv::StringRecord) -> Result<Draw, LottoError> {
    let get = |idx: usize| -> Result<String, LottoError> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| LottoError::Validation(format!("missing field at index {}", idx)))
    };

    let parse_field = |idx: usize| -> Result<u64, LottoError> {
        let s = get(idx)?;
        s.parse::<u64>()
            .map_err(|_| LottoError::Validation(format!("cannot parse '{}' (index {})", s, idx)))
    };

    let raw_date = get(0)?;
    let draw_date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
        .map_err(|_| LottoError::Validation(format!("bad date '{}'", raw_date)))?;

    let draw_number = u32::try_from(parse_field(1)?)
        .map_err(|_| LottoError::Validation("draw number too large".to_string()))?;

    let numbers = parse_numbers(&get(2)?)?;

    let bonus_number = u8::try_from(parse_field(3)?)
        .map_err(|_| LottoError::Validation("bonus number too large".to_string()))?;

    // Jackpot and MaxMillions columns are optional and may be blank.
    let jackpot_amount = match record.get(4).map(str::trim) {
        Some(s) if !s.is_empty() => parse_field(4)?,
        _ => 0,
    };
    let maxmillions_count = match record.get(5).map(str::trim) {
        Some(s) if !s.is_empty() => u32::try_from(parse_field(5)?)
            .map_err(|_| LottoError::Validation("maxmillions count too large".to_string()))?,
        _ => 0,
    };

    Ok(Draw {
        draw_date,
        draw_number,
        numbers,
        bonus_number,
        jackpot_amount,
        maxmillions_count,
    })
}

/// Numbers separated by spaces, commas or dashes, order kept.
pub fn parse_numbers(raw: &str) -> Result<Vec<u8>, LottoError> {
    raw.split(|c: char| c == ',' || c == '-' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u8>()
                .map_err(|_| LottoError::Validation(format!("bad number '{}' in '{}'", s, raw)))
        })
        .collect()
}

/// Imports draws of `game` from a headered CSV file:
/// `draw_date,draw_number,numbers,bonus_number,jackpot_amount[,maxmillions_count]`.
pub fn import_csv(conn: &Connection, game: Game, path: &Path) -> Result<IngestReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open {:?}", path))?;

    let rows: Vec<Result<Draw, LottoError>> = reader
        .records()
        .map(|record| {
            record
                .map_err(|e| LottoError::Validation(format!("unreadable line: {}", e)))
                .and_then(|record| parse_record(&record))
        })
        .collect();

    let report = ingest_draws(conn, game, rows).context("Import failed")?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::tests::memory_db;
    use lottoscan_db::db::fetch_all;
    use std::io::Write;

    #[test]
    fn test_parse_numbers_separators() {
        assert_eq!(parse_numbers("1 2 3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_numbers("12,7,3").unwrap(), vec![12, 7, 3]);
        assert_eq!(parse_numbers(" 4 - 5 - 6 ").unwrap(), vec![4, 5, 6]);
        assert!(parse_numbers("1 two 3").is_err());
    }

    #[test]
    fn test_import_csv_skips_bad_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "draw_date,draw_number,numbers,bonus_number,jackpot_amount,maxmillions_count").unwrap();
        writeln!(file, "2024-01-02,1001,1 2 3 4 5 6 7,8,60000000,4").unwrap();
        writeln!(file, "2024-01-05,1002,\"9,10,11,12,13,14,15\",16,,").unwrap();
        writeln!(file, "not-a-date,1003,1 2 3 4 5 6 7,8,0,0").unwrap();
        writeln!(file, "2024-01-12,1004,1 2 3 4 5 6,8,0,0").unwrap();
        writeln!(file, "2024-01-16,1005,20 21 22 23 24 25 26,27").unwrap();
        file.flush().unwrap();

        let conn = memory_db();
        let report = import_csv(&conn, Game::LottoMax, file.path()).unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped, 2);

        let stored = fetch_all(&conn, Game::LottoMax).unwrap();
        assert_eq!(stored[0].maxmillions_count, 4);
        assert_eq!(stored[0].jackpot_amount, 60_000_000);
        assert_eq!(stored[1].numbers, vec![9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(stored[2].jackpot_amount, 0);
    }

    #[test]
    fn test_oversized_jackpot_skips_only_its_row() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "draw_date,draw_number,numbers,bonus_number,jackpot_amount").unwrap();
        writeln!(file, "2024-01-03,1,1 2 3 4 5 6,7,5000000").unwrap();
        writeln!(file, "2024-01-06,2,8 9 10 11 12 13,14,10000000000000000000").unwrap();
        writeln!(file, "2024-01-10,3,15 16 17 18 19 20,21,6000000").unwrap();
        file.flush().unwrap();

        let conn = memory_db();
        let report = import_csv(&conn, Game::Lotto649, file.path()).unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);

        let stored: Vec<u32> = fetch_all(&conn, Game::Lotto649).unwrap().iter().map(|d| d.draw_number).collect();
        assert_eq!(stored, vec![1, 3]);
    }

    #[test]
    fn test_import_missing_file_is_fatal() {
        let conn = memory_db();
        let dir = tempfile::tempdir().unwrap();
        assert!(import_csv(&conn, Game::Lotto649, &dir.path().join("none.csv")).is_err());
    }
}
