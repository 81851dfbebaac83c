use std::thread;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use lottoscan_db::error::{LottoError, Result};
use lottoscan_db::models::{Draw, Game};
use lottoscan_db::rusqlite::Connection;

use super::html::table_rows;
use super::{ingest_draws, IngestReport};
use crate::config::ScrapeConfig;

/// Anything that can hand back the body of a results page.
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

pub struct HttpSource {
    client: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(config: &ScrapeConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout())
            .build()
            .map_err(|e| LottoError::Network(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String> {
        let network = |e: reqwest::Error| LottoError::Network(format!("{url}: {e}"));
        self.client
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.text())
            .map_err(network)
    }
}

/// Fetches `url`, trying up to `max_attempts` times with `retry_delay` between tries.
pub fn fetch_with_retry<S: PageSource + ?Sized>(
    source: &S,
    url: &str,
    max_attempts: u32,
    retry_delay: Duration,
) -> Result<String> {
    let attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match source.fetch(url) {
            Ok(body) => return Ok(body),
            Err(e) if attempt < attempts => {
                log::warn!("attempt {attempt}/{attempts} failed: {e}");
                attempt += 1;
                if !retry_delay.is_zero() {
                    thread::sleep(retry_delay);
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Scrapes every configured page of `game` and ingests what parses.
///
/// Pages are fetched one after the other with the politeness delay in between.
/// A page that keeps failing is reported in `failed_pages`; only store errors
/// end the run.
pub fn scrape_game<S: PageSource + ?Sized>(
    conn: &Connection,
    game: Game,
    source: &S,
    config: &ScrapeConfig,
) -> Result<IngestReport> {
    let mut report = IngestReport::default();

    for (i, url) in config.urls(game).iter().enumerate() {
        if i > 0 && !config.delay().is_zero() {
            thread::sleep(config.delay());
        }
        log::info!("{game}: fetching {url}");
        let body = match fetch_with_retry(source, url, config.max_attempts, config.retry_delay()) {
            Ok(body) => body,
            Err(e) => {
                log::error!("{game}: giving up on {url}: {e}");
                report.failed_pages.push(url.clone());
                continue;
            }
        };

        let rows = parse_draw_page(&body, game);
        if rows.is_empty() {
            log::warn!("{game}: no draw rows found on {url}");
        }
        report.merge(ingest_draws(conn, game, rows)?);
    }

    Ok(report)
}

/// Extracts candidate draws from a results page: the embedded `drawResults`
/// JSON when present, otherwise the HTML tables.
pub fn parse_draw_page(html: &str, game: Game) -> Vec<Result<Draw>> {
    let from_json = embedded_draw_results(html)
        .map(|items| items.iter().map(|item| draw_from_json(item, game)).collect::<Vec<_>>())
        .unwrap_or_default();
    if !from_json.is_empty() {
        return from_json;
    }

    table_rows(html)
        .iter()
        .filter_map(|cells| draw_from_cells(cells, game))
        .collect()
}

fn embedded_draw_results(html: &str) -> Option<Vec<Value>> {
    let mut from = 0;
    while let Some(rel) = html[from..].find("drawResults") {
        let after_key = from + rel + "drawResults".len();
        from = after_key;
        let rest = html[after_key..].trim_start();
        let Some(rest) = rest.strip_prefix('=') else { continue };
        let rest = rest.trim_start();
        if !rest.starts_with('[') {
            continue;
        }
        let Some(end) = matching_bracket(rest) else { continue };
        match serde_json::from_str::<Vec<Value>>(&rest[..=end]) {
            Ok(items) => return Some(items),
            Err(e) => log::debug!("drawResults is not valid JSON: {e}"),
        }
    }
    None
}

// Index of the `]` closing the array that opens at byte 0, skipping string contents.
fn matching_bracket(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn draw_from_json(item: &Value, game: Game) -> Result<Draw> {
    let invalid = |msg: &str| LottoError::Validation(format!("drawResults entry: {msg}"));

    let raw_date = item.get("drawDate").and_then(Value::as_str).ok_or_else(|| invalid("no drawDate"))?;
    let draw_date = parse_date(raw_date).ok_or_else(|| invalid(&format!("bad date '{raw_date}'")))?;

    let numbers = match item.get("winningNumbers") {
        Some(Value::Array(values)) => values
            .iter()
            .map(json_u64)
            .map(|n| n.and_then(|n| u8::try_from(n).ok()))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| invalid("non-numeric winningNumbers"))?,
        Some(Value::String(s)) => extract_numbers(s, game.max_number()),
        _ => return Err(invalid("no winningNumbers")),
    };

    let bonus_number = item
        .get("bonusNumber")
        .and_then(json_u64)
        .and_then(|n| u8::try_from(n).ok())
        .ok_or_else(|| invalid(&format!("no bonus number for {draw_date}")))?;

    let draw_number = match item.get("drawNumber").and_then(json_u64) {
        Some(n) => u32::try_from(n).map_err(|_| invalid("drawNumber too large"))?,
        None => date_draw_number(draw_date),
    };

    Ok(Draw {
        draw_date,
        draw_number,
        numbers,
        bonus_number,
        jackpot_amount: item.get("jackpot").and_then(json_u64).unwrap_or(0),
        maxmillions_count: item
            .get("maxMillions")
            .and_then(json_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0),
    })
}

// Numbers on these pages come as JSON numbers or as text like "$5,000,000".
fn json_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => digits(s),
        _ => None,
    }
}

fn digits(s: &str) -> Option<u64> {
    let only: String = s.chars().filter(char::is_ascii_digit).collect();
    only.parse().ok()
}

/// `None` for rows without a recognizable date (headers, footers, ads).
fn draw_from_cells(cells: &[String], game: Game) -> Option<Result<Draw>> {
    if cells.len() < 2 {
        return None;
    }
    let draw_date = parse_date(&cells[0])?;

    let values = extract_numbers(&cells[1], game.max_number());
    let arity = game.arity();
    if values.len() < arity + 1 {
        return Some(Err(LottoError::Validation(format!(
            "{draw_date}: expected {} numbers plus bonus, found {}",
            arity,
            values.len()
        ))));
    }

    Some(Ok(Draw {
        draw_date,
        draw_number: date_draw_number(draw_date),
        numbers: values[..arity].to_vec(),
        bonus_number: values[arity],
        jackpot_amount: cells.get(2).and_then(|c| digits(c)).unwrap_or(0),
        maxmillions_count: 0,
    }))
}

/// Whole numbers in `text` that fall inside `1..=max`, in order of appearance.
fn extract_numbers(text: &str, max: u8) -> Vec<u8> {
    text.split(|c: char| !c.is_ascii_digit())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse::<u32>().ok())
        .filter(|&n| n >= 1 && n <= max as u32)
        .map(|n| n as u8)
        .collect()
}

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%B %d, %Y", "%b %d, %Y", "%A, %B %d, %Y"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    // ISO date buried in other text, e.g. "Draw of 2024-01-03 (Wed)"
    raw.char_indices()
        .filter_map(|(i, _)| raw.get(i..i + 10))
        .find_map(|window| NaiveDate::parse_from_str(window, "%Y-%m-%d").ok())
}

/// Stand-in draw number for sources that only give the date: `YYYYMMDD`.
/// Unique per game since there is at most one draw a day, and ordered by date.
pub fn date_draw_number(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}
