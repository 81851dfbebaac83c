pub mod csv_import;
pub mod html;
pub mod sample;
pub mod scrape;

use lottoscan_db::db::{upsert_draw, Upsert};
use lottoscan_db::error::{LottoError, Result};
use lottoscan_db::models::{Draw, Game};
use lottoscan_db::rusqlite::Connection;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub total: u32,
    pub inserted: u32,
    pub replaced: u32,
    pub skipped: u32,
    /// Pages given up on after the retry budget ran out.
    pub failed_pages: Vec<String>,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.total += other.total;
        self.inserted += other.inserted;
        self.replaced += other.replaced;
        self.skipped += other.skipped;
        self.failed_pages.extend(other.failed_pages);
    }
}

/// Upserts candidate rows inside one transaction.
///
/// Rows that failed upstream parsing or do not validate are logged and counted
/// as skipped; the rest of the batch still goes in. Store errors abort.
pub fn ingest_draws<I>(conn: &Connection, game: Game, rows: I) -> Result<IngestReport>
where
    I: IntoIterator<Item = Result<Draw>>,
{
    let tx = conn.unchecked_transaction()?;
    let mut report = IngestReport::default();

    for row in rows {
        report.total += 1;
        let draw = match row {
            Ok(draw) => draw,
            Err(e) => {
                log::warn!("{game}: skipping row {}: {e}", report.total);
                report.skipped += 1;
                continue;
            }
        };
        match upsert_draw(&tx, game, &draw) {
            Ok(Upsert::Inserted) => report.inserted += 1,
            Ok(Upsert::Replaced) => report.replaced += 1,
            Err(LottoError::Validation(msg)) => {
                log::warn!("{game}: skipping row {}: {msg}", report.total);
                report.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tx.commit()?;
    log::info!(
        "{game}: {} rows, {} inserted, {} replaced, {} skipped",
        report.total,
        report.inserted,
        report.replaced,
        report.skipped
    );
    Ok(report)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lottoscan_db::db::{fetch_all, migrate};

    pub(crate) fn memory_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    pub(crate) fn draw(number: u32, numbers: Vec<u8>) -> Draw {
        Draw {
            draw_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(number as u64),
            draw_number: number,
            numbers,
            bonus_number: 20,
            jackpot_amount: 0,
            maxmillions_count: 0,
        }
    }

    #[test]
    fn test_bad_rows_do_not_abort_batch() {
        let conn = memory_db();
        let rows = vec![
            Ok(draw(1, vec![1, 2, 3, 4, 5, 6])),
            Ok(draw(2, vec![1, 1, 3, 4, 5, 6])),
            Err(LottoError::Validation("unparseable row".to_string())),
            Ok(draw(3, vec![7, 8, 9, 10, 11, 12])),
            Ok(draw(1, vec![40, 41, 42, 43, 44, 45])),
        ];

        let report = ingest_draws(&conn, Game::Lotto649, rows).unwrap();
        assert_eq!(report.total, 5);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.replaced, 1);
        assert_eq!(report.skipped, 2);

        let stored = fetch_all(&conn, Game::Lotto649).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].numbers, vec![40, 41, 42, 43, 44, 45]);
    }

    #[test]
    fn test_merge_reports() {
        let mut total = IngestReport {
            total: 2,
            inserted: 2,
            ..Default::default()
        };
        total.merge(IngestReport {
            total: 1,
            skipped: 1,
            failed_pages: vec!["http://x".to_string()],
            ..Default::default()
        });
        assert_eq!(total.total, 3);
        assert_eq!(total.skipped, 1);
        assert_eq!(total.failed_pages.len(), 1);
    }
}
