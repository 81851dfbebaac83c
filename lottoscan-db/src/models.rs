use std::collections::HashSet;

use chrono::{NaiveDate, Weekday};

use crate::error::{LottoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Game {
    Lotto649,
    LottoMax,
}

impl Game {
    pub const ALL: [Game; 2] = [Game::Lotto649, Game::LottoMax];

    pub fn table(&self) -> &'static str {
        match self {
            Game::Lotto649 => "lotto649_results",
            Game::LottoMax => "lottomax_results",
        }
    }

    /// Count of main numbers per draw.
    pub fn arity(&self) -> usize {
        match self {
            Game::Lotto649 => 6,
            Game::LottoMax => 7,
        }
    }

    /// Highest valid ball; the range always starts at 1.
    pub fn max_number(&self) -> u8 {
        match self {
            Game::Lotto649 => 49,
            Game::LottoMax => 50,
        }
    }

    pub fn draw_weekdays(&self) -> &'static [Weekday] {
        match self {
            Game::Lotto649 => &[Weekday::Wed, Weekday::Sat],
            Game::LottoMax => &[Weekday::Tue, Weekday::Fri],
        }
    }

    pub fn has_maxmillions(&self) -> bool {
        matches!(self, Game::LottoMax)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Game::Lotto649 => "Lotto 6/49",
            Game::LottoMax => "LottoMax",
        }
    }
}

impl std::fmt::Display for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub draw_date: NaiveDate,
    pub draw_number: u32,
    pub numbers: Vec<u8>,
    pub bonus_number: u8,
    pub jackpot_amount: u64,
    pub maxmillions_count: u32,
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Hot,
    Balanced,
    Cold,
    Random,
    HotVariant,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Hot,
        Strategy::Balanced,
        Strategy::Cold,
        Strategy::Random,
        Strategy::HotVariant,
    ];
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Hot => write!(f, "hot"),
            Strategy::Balanced => write!(f, "balanced"),
            Strategy::Cold => write!(f, "cold"),
            Strategy::Random => write!(f, "random"),
            Strategy::HotVariant => write!(f, "hot-variant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub strategy: Strategy,
    pub numbers: Vec<u8>,
}

/// Checks a set of main numbers: exact arity, all within `1..=max_number`, no repeats.
pub fn validate_numbers(numbers: &[u8], arity: usize, max_number: u8) -> Result<()> {
    if numbers.len() != arity {
        return Err(LottoError::Validation(format!(
            "expected {} numbers, got {}",
            arity,
            numbers.len()
        )));
    }
    for &n in numbers {
        if n < 1 || n > max_number {
            return Err(LottoError::Validation(format!(
                "number {} out of range (1-{})",
                n, max_number
            )));
        }
    }
    let mut seen = HashSet::with_capacity(numbers.len());
    for &n in numbers {
        if !seen.insert(n) {
            return Err(LottoError::Validation(format!("duplicate number: {}", n)));
        }
    }
    Ok(())
}

/// Largest jackpot the store can hold.
pub const MAX_JACKPOT: u64 = i64::MAX as u64;

pub fn validate_draw(game: Game, draw: &Draw) -> Result<()> {
    if draw.draw_number == 0 {
        return Err(LottoError::Validation("draw number must be positive".to_string()));
    }
    validate_numbers(&draw.numbers, game.arity(), game.max_number())
        .map_err(|e| match e {
            LottoError::Validation(msg) => {
                LottoError::Validation(format!("draw {}: {}", draw.draw_number, msg))
            }
            other => other,
        })?;
    if draw.bonus_number < 1 || draw.bonus_number > game.max_number() {
        return Err(LottoError::Validation(format!(
            "draw {}: bonus {} out of range (1-{})",
            draw.draw_number,
            draw.bonus_number,
            game.max_number()
        )));
    }
    // SQLite integers are signed 64-bit
    if draw.jackpot_amount > MAX_JACKPOT {
        return Err(LottoError::Validation(format!(
            "draw {}: jackpot {} too large",
            draw.draw_number, draw.jackpot_amount
        )));
    }
    if !game.has_maxmillions() && draw.maxmillions_count != 0 {
        return Err(LottoError::Validation(format!(
            "draw {}: {} has no MaxMillions draws",
            draw.draw_number, game
        )));
    }
    Ok(())
}

pub fn encode_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_numbers(raw: &str) -> Result<Vec<u8>> {
    raw.split(',')
        .map(|part| {
            let part = part.trim();
            part.parse::<u8>()
                .map_err(|_| LottoError::Validation(format!("bad number '{}' in '{}'", part, raw)))
        })
        .collect()
}
