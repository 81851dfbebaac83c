use lottoscan_db::models::{Draw, Game, NumberStats};

/// Per-number counts over one game's history, main balls only.
#[derive(Debug, Clone)]
pub struct FrequencySnapshot {
    pub game: Game,
    pub total_draws: u32,
    /// One entry per valid number, ascending: `stats[n - 1]` describes `n`.
    pub stats: Vec<NumberStats>,
    /// Bonus-ball counts, same indexing as `stats`. Kept apart from the main counts.
    pub bonus_counts: Vec<u32>,
    pub hot: Vec<u8>,
    pub cold: Vec<u8>,
}

impl FrequencySnapshot {
    pub fn pool_size(&self) -> usize {
        self.stats.len()
    }

    pub fn count(&self, number: u8) -> u32 {
        self.stat(number).map(|s| s.frequency).unwrap_or(0)
    }

    pub fn bonus_count(&self, number: u8) -> u32 {
        (number as usize)
            .checked_sub(1)
            .and_then(|i| self.bonus_counts.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn stat(&self, number: u8) -> Option<&NumberStats> {
        (number as usize).checked_sub(1).and_then(|i| self.stats.get(i))
    }

    /// Every number, most drawn first; ties go to the lower number.
    pub fn ranked_desc(&self) -> Vec<u8> {
        let mut ranked: Vec<&NumberStats> = self.stats.iter().collect();
        ranked.sort_by(|a, b| b.frequency.cmp(&a.frequency).then(a.number.cmp(&b.number)));
        ranked.into_iter().map(|s| s.number).collect()
    }

    /// Every number, least drawn first; ties go to the lower number.
    pub fn ranked_asc(&self) -> Vec<u8> {
        let mut ranked: Vec<&NumberStats> = self.stats.iter().collect();
        ranked.sort_by(|a, b| a.frequency.cmp(&b.frequency).then(a.number.cmp(&b.number)));
        ranked.into_iter().map(|s| s.number).collect()
    }

    pub fn drawn_numbers(&self) -> usize {
        self.stats.iter().filter(|s| s.frequency > 0).count()
    }
}

/// Counts how often each number of `game` came out across `draws` (oldest first).
///
/// Every valid number gets an entry, zero if never drawn. `hot` holds the top
/// `k` of the count ranking and `cold` its bottom `k`, listed ascending; with no
/// draws these are simply the first and last `k` numbers.
pub fn compute_frequency(draws: &[Draw], game: Game, k: usize) -> FrequencySnapshot {
    let pool_size = game.max_number();
    let mut stats: Vec<NumberStats> = (1..=pool_size)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: draws.len() as u32,
        })
        .collect();
    let mut bonus_counts = vec![0u32; pool_size as usize];

    for (i, draw) in draws.iter().enumerate() {
        let age = (draws.len() - 1 - i) as u32;
        for &n in &draw.numbers {
            // wrapping_sub sends 0 out of bounds
            if let Some(stat) = stats.get_mut((n as usize).wrapping_sub(1)) {
                stat.frequency += 1;
                stat.gap = age;
            }
        }
        if let Some(count) = bonus_counts.get_mut((draw.bonus_number as usize).wrapping_sub(1)) {
            *count += 1;
        }
    }

    let mut snapshot = FrequencySnapshot {
        game,
        total_draws: draws.len() as u32,
        stats,
        bonus_counts,
        hot: Vec::new(),
        cold: Vec::new(),
    };

    let k = k.min(snapshot.pool_size());
    let ranked = snapshot.ranked_desc();
    snapshot.hot = ranked[..k].to_vec();
    let mut cold = ranked[ranked.len() - k..].to_vec();
    cold.sort();
    snapshot.cold = cold;
    snapshot
}
