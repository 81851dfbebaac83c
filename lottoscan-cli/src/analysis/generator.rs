use rand::rngs::StdRng;
use rand::seq::index;

use lottoscan_db::error::{LottoError, Result};
use lottoscan_db::models::{validate_numbers, Entry, Strategy};

use super::frequency::FrequencySnapshot;

/// Builds one entry per strategy, in `Strategy::ALL` order.
///
/// Each entry is sorted ascending and checked against the draw rules before
/// it is returned. Fails when the pool is too small to give `arity` distinct
/// numbers plus the extra one the hot variant needs.
pub fn generate_entries(snapshot: &FrequencySnapshot, arity: usize, rng: &mut StdRng) -> Result<Vec<Entry>> {
    let pool_size = snapshot.pool_size();
    if arity == 0 {
        return Err(LottoError::Generation("entries need at least one number".to_string()));
    }
    if pool_size < arity + 1 {
        return Err(LottoError::Generation(format!(
            "{} numbers cannot fill {} distinct entries of {}",
            pool_size,
            Strategy::ALL.len(),
            arity
        )));
    }

    let by_count_desc = snapshot.ranked_desc();
    let by_count_asc = snapshot.ranked_asc();

    let mut entries = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let mut numbers = match strategy {
            Strategy::Hot => by_count_desc[..arity].to_vec(),
            Strategy::Balanced => balanced(&by_count_desc, &by_count_asc, arity),
            Strategy::Cold => by_count_asc[..arity].to_vec(),
            Strategy::Random => index::sample(rng, pool_size, arity)
                .into_iter()
                .map(|i| (i + 1) as u8)
                .collect(),
            Strategy::HotVariant => by_count_desc[1..=arity].to_vec(),
        };
        numbers.sort();

        validate_numbers(&numbers, arity, pool_size as u8)
            .map_err(|e| LottoError::Generation(format!("{strategy} entry rejected: {e}")))?;
        entries.push(Entry { strategy, numbers });
    }

    Ok(entries)
}

// Upper half from the hot end, rest from the cold end, skipping picks already made.
fn balanced(by_count_desc: &[u8], by_count_asc: &[u8], arity: usize) -> Vec<u8> {
    let hot_share = arity.div_ceil(2);
    let mut picked: Vec<u8> = by_count_desc[..hot_share].to_vec();
    for &n in by_count_asc {
        if picked.len() == arity {
            break;
        }
        if !picked.contains(&n) {
            picked.push(n);
        }
    }
    picked
}
