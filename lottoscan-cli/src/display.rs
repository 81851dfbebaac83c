use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::analysis::frequency::FrequencySnapshot;
use crate::analysis::GameAnalysis;
use crate::ingest::IngestReport;
use lottoscan_db::models::{Draw, Entry, Game, Strategy};

fn join_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn format_amount(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    format!("${out}")
}

pub fn display_draws(game: Game, draws: &[Draw]) {
    if draws.is_empty() {
        println!("No {} draws to show.", game);
        return;
    }

    let mut header = vec!["Date", "Draw", "Numbers", "Bonus", "Jackpot"];
    if game.has_maxmillions() {
        header.push("MaxMillions");
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for draw in draws {
        let jackpot = if draw.jackpot_amount > 0 {
            format_amount(draw.jackpot_amount)
        } else {
            "—".to_string()
        };

        let mut row = vec![
            draw.draw_date.to_string(),
            draw.draw_number.to_string(),
            join_numbers(&draw.numbers),
            draw.bonus_number.to_string(),
            jackpot,
        ];
        if game.has_maxmillions() {
            row.push(draw.maxmillions_count.to_string());
        }
        table.add_row(row);
    }

    println!("\n── {} ──", game);
    println!("{table}");
}

pub fn display_ingest_summary(game: Game, report: &IngestReport) {
    println!("{} ingestion finished:", game);
    println!("  Rows read      : {}", report.total);
    println!("  Inserted       : {}", report.inserted);
    println!("  Replaced       : {}", report.replaced);
    if report.skipped > 0 {
        println!("  Skipped        : {}", report.skipped);
    }
    if !report.failed_pages.is_empty() {
        println!("  Failed pages   : {}", report.failed_pages.len());
        for url in &report.failed_pages {
            println!("    {}", url);
        }
    }
}

fn frequency_table(snapshot: &FrequencySnapshot, numbers: &[u8], color: Color) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Number", "Drawn", "Gap", "As bonus"]);

    for &n in numbers {
        let gap = snapshot.stat(n).map(|s| s.gap).unwrap_or(0);
        table.add_row(vec![
            Cell::new(format!("{:2}", n)).fg(color),
            Cell::new(snapshot.count(n)),
            Cell::new(gap),
            Cell::new(snapshot.bonus_count(n)),
        ]);
    }
    table
}

pub fn display_frequency(snapshot: &FrequencySnapshot) {
    println!(
        "\n📊 {} frequency analysis over {} draws (numbers 1-{})\n",
        snapshot.game,
        snapshot.total_draws,
        snapshot.pool_size()
    );

    println!("── Most frequent ──");
    println!("{}", frequency_table(snapshot, &snapshot.hot, Color::Green));

    println!("\n── Least frequent ──");
    println!("{}", frequency_table(snapshot, &snapshot.cold, Color::Red));

    println!(
        "\nNumbers drawn at least once: {}/{}",
        snapshot.drawn_numbers(),
        snapshot.pool_size()
    );
}

pub fn display_entries(game: Game, entries: &[Entry]) {
    println!("\n🎲 {} suggested entries\n", game);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Strategy", "Numbers"]);

    for (i, entry) in entries.iter().enumerate() {
        let color = match entry.strategy {
            Strategy::Hot | Strategy::HotVariant => Color::Green,
            Strategy::Cold => Color::Red,
            Strategy::Balanced => Color::Yellow,
            Strategy::Random => Color::White,
        };
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(entry.strategy.to_string()).fg(color),
            Cell::new(join_numbers(&entry.numbers)),
        ]);
    }
    println!("{table}");
}

pub fn display_analysis(analysis: &GameAnalysis) {
    display_frequency(&analysis.snapshot);
    display_entries(analysis.snapshot.game, &analysis.entries);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0), "$0");
        assert_eq!(format_amount(999), "$999");
        assert_eq!(format_amount(1_000), "$1,000");
        assert_eq!(format_amount(70_000_000), "$70,000,000");
    }

    #[test]
    fn test_join_numbers() {
        assert_eq!(join_numbers(&[3, 14, 15]), " 3 - 14 - 15");
    }
}
