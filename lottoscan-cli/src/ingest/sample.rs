use chrono::{Datelike, Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::index;
use rand::RngExt;

use lottoscan_db::error::{LottoError, Result};
use lottoscan_db::models::{Draw, Game};

/// Longest history `generate_sample_draws` will synthesize.
pub const MAX_SAMPLE_YEARS: u32 = 200;

fn jackpot_range(game: Game) -> std::ops::RangeInclusive<u64> {
    match game {
        Game::Lotto649 => 5_000_000..=50_000_000,
        Game::LottoMax => 10_000_000..=70_000_000,
    }
}

/// Synthesizes `years` of draw history ending at `end_date`, following the
/// game's real draw days. Same seed, same history.
pub fn generate_sample_draws(game: Game, years: u32, end_date: NaiveDate, rng: &mut StdRng) -> Result<Vec<Draw>> {
    if years > MAX_SAMPLE_YEARS {
        return Err(LottoError::Validation(format!(
            "cannot generate {years} years of history (at most {MAX_SAMPLE_YEARS})"
        )));
    }
    let start = end_date
        .checked_sub_days(Days::new(years as u64 * 365))
        .ok_or_else(|| LottoError::Validation(format!("{years} years before {end_date} is out of range")))?;
    let max = game.max_number() as usize;
    let arity = game.arity();

    let mut draws = Vec::new();
    let mut draw_number = 1u32;

    for day in start.iter_days().take_while(|d| *d <= end_date) {
        if !game.draw_weekdays().contains(&day.weekday()) {
            continue;
        }

        let mut numbers: Vec<u8> = index::sample(rng, max, arity)
            .into_iter()
            .map(|i| (i + 1) as u8)
            .collect();
        numbers.sort();

        let remaining: Vec<u8> = (1..=game.max_number())
            .filter(|n| !numbers.contains(n))
            .collect();
        let bonus_number = remaining[rng.random_range(0..remaining.len())];

        let maxmillions_count = if game.has_maxmillions() && rng.random_bool(0.3) {
            rng.random_range(0..=10)
        } else {
            0
        };

        draws.push(Draw {
            draw_date: day,
            draw_number,
            numbers,
            bonus_number,
            jackpot_amount: rng.random_range(jackpot_range(game)),
            maxmillions_count,
        });
        draw_number += 1;
    }

    Ok(draws)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lottoscan_db::models::validate_draw;
    use rand::SeedableRng;

    fn end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    #[test]
    fn test_sample_draws_are_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        for game in Game::ALL {
            let draws = generate_sample_draws(game, 2, end(), &mut rng).unwrap();
            assert!(draws.len() > 200, "{game}: {} draws", draws.len());
            for draw in &draws {
                validate_draw(game, draw).unwrap();
                assert!(!draw.numbers.contains(&draw.bonus_number));
                assert!(draw.numbers.windows(2).all(|w| w[0] < w[1]));
                assert!(jackpot_range(game).contains(&draw.jackpot_amount));
            }
        }
    }

    #[test]
    fn test_sample_cadence_and_numbering() {
        let mut rng = StdRng::seed_from_u64(1);
        let draws = generate_sample_draws(Game::Lotto649, 1, end(), &mut rng).unwrap();

        // two draws a week over 365 days
        assert!((103..=106).contains(&draws.len()));
        for (i, draw) in draws.iter().enumerate() {
            assert_eq!(draw.draw_number, i as u32 + 1);
            assert!(Game::Lotto649.draw_weekdays().contains(&draw.draw_date.weekday()));
            assert!(draw.draw_date <= end());
        }
        assert!(draws.windows(2).all(|w| w[0].draw_date < w[1].draw_date));
    }

    #[test]
    fn test_sample_is_deterministic_for_seed() {
        let a = generate_sample_draws(Game::LottoMax, 1, end(), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_sample_draws(Game::LottoMax, 1, end(), &mut StdRng::seed_from_u64(7)).unwrap();
        let c = generate_sample_draws(Game::LottoMax, 1, end(), &mut StdRng::seed_from_u64(8)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sample_maxmillions_only_for_max() {
        let mut rng = StdRng::seed_from_u64(3);
        let draws = generate_sample_draws(Game::Lotto649, 1, end(), &mut rng).unwrap();
        assert!(draws.iter().all(|d| d.maxmillions_count == 0));

        let draws = generate_sample_draws(Game::LottoMax, 3, end(), &mut rng).unwrap();
        assert!(draws.iter().any(|d| d.maxmillions_count > 0));
        assert!(draws.iter().all(|d| d.maxmillions_count <= 10));
    }

    #[test]
    fn test_zero_years_yields_at_most_one_draw() {
        let mut rng = StdRng::seed_from_u64(3);
        let draws = generate_sample_draws(Game::Lotto649, 0, end(), &mut rng).unwrap();
        assert!(draws.len() <= 1);
    }

    #[test]
    fn test_years_beyond_limit_are_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = generate_sample_draws(Game::Lotto649, 500_000_000, end(), &mut rng).unwrap_err();
        assert!(matches!(err, LottoError::Validation(_)));

        let early = NaiveDate::from_ymd_opt(-262_000, 6, 30).unwrap();
        let err = generate_sample_draws(Game::Lotto649, MAX_SAMPLE_YEARS, early, &mut rng).unwrap_err();
        assert!(matches!(err, LottoError::Validation(_)));

        let draws = generate_sample_draws(Game::Lotto649, MAX_SAMPLE_YEARS, end(), &mut rng).unwrap();
        assert!(draws.len() > MAX_SAMPLE_YEARS as usize * 100);
    }
}
