mod analysis;
mod config;
mod display;
mod ingest;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::analysis::analyze_game;
use crate::config::ScrapeConfig;
use crate::display::{display_analysis, display_draws, display_ingest_summary};
use crate::ingest::csv_import::import_csv;
use crate::ingest::sample::{generate_sample_draws, MAX_SAMPLE_YEARS};
use crate::ingest::scrape::{HttpSource, scrape_game};
use crate::ingest::ingest_draws;
use lottoscan_db::db::{count_draws, db_path, fetch_last_draws, migrate, open_db, reset};
use lottoscan_db::error::LottoError;
use lottoscan_db::models::Game;
use lottoscan_db::rusqlite::Connection;

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum GameSelector {
    #[value(name = "649")]
    Lotto649,
    Max,
    #[default]
    All,
}

impl GameSelector {
    fn games(self) -> Vec<Game> {
        match self {
            GameSelector::Lotto649 => vec![Game::Lotto649],
            GameSelector::Max => vec![Game::LottoMax],
            GameSelector::All => Game::ALL.to_vec(),
        }
    }
}

#[derive(Parser)]
#[command(name = "lottoscan", about = "Lotto 6/49 and LottoMax history and frequency analyser")]
struct Cli {
    /// Database file (default: ./data/lottoscan.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate synthetic draw history
    Sample {
        /// Years of history to generate
        #[arg(short, long, default_value = "20", value_parser = clap::value_parser!(u32).range(..=MAX_SAMPLE_YEARS as i64))]
        years: u32,

        /// Game(s) to generate
        #[arg(short, long, default_value = "all")]
        game: GameSelector,

        /// Seed for reproducible data
        #[arg(long)]
        seed: Option<u64>,

        /// Clear stored draws of the game(s) first
        #[arg(long)]
        reset: bool,
    },

    /// Scrape past results from the web
    Scrape {
        #[arg(short, long, default_value = "all")]
        game: GameSelector,

        /// JSON scraper configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pause between page requests, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Tries per page before giving up on it
        #[arg(long)]
        attempts: Option<u32>,

        /// Per-request timeout, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Import draws from a CSV file
    Import {
        #[arg(short, long)]
        game: GameSelector,

        /// CSV with columns draw_date,draw_number,numbers,bonus_number,jackpot_amount[,maxmillions_count]
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Show hot and cold numbers and suggest 5 entries
    Analyze {
        #[arg(short, long, default_value = "all")]
        game: GameSelector,

        /// Size of the hot and cold lists (default: numbers per draw)
        #[arg(short, long)]
        top: Option<usize>,

        /// Seed for the random entry
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List the latest draws
    List {
        #[arg(short, long, default_value = "all")]
        game: GameSelector,

        /// Number of draws to show
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Delete stored draws
    Reset {
        #[arg(short, long)]
        game: GameSelector,
    },

    /// Print the database path
    DbPath,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let path = cli.db.unwrap_or_else(db_path);

    if let Command::DbPath = cli.command {
        println!("{}", path.display());
        return Ok(());
    }

    let conn = open_db(&path).with_context(|| format!("Cannot open database {:?}", path))?;
    migrate(&conn).context("Migration failed")?;

    match cli.command {
        Command::Sample {
            years,
            game,
            seed,
            reset,
        } => cmd_sample(&conn, game, years, seed, reset),
        Command::Scrape {
            game,
            config,
            delay_ms,
            attempts,
            timeout_secs,
        } => {
            let mut scrape_config = match config {
                Some(file) => ScrapeConfig::load(&file)?,
                None => ScrapeConfig::default(),
            };
            if let Some(delay_ms) = delay_ms {
                scrape_config.delay_ms = delay_ms;
            }
            if let Some(attempts) = attempts {
                scrape_config.max_attempts = attempts;
            }
            if let Some(timeout_secs) = timeout_secs {
                scrape_config.timeout_secs = timeout_secs;
            }
            cmd_scrape(&conn, game, &scrape_config)
        }
        Command::Import { game, file } => cmd_import(&conn, game, &file),
        Command::Analyze { game, top, seed } => cmd_analyze(&conn, game, top, seed),
        Command::List { game, last } => cmd_list(&conn, game, last),
        Command::Reset { game } => cmd_reset(&conn, game),
        Command::DbPath => Ok(()),
    }
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

fn cmd_sample(conn: &Connection, selector: GameSelector, years: u32, seed: Option<u64>, clear: bool) -> Result<()> {
    let mut rng = make_rng(seed);
    let today = chrono::Local::now().date_naive();

    for game in selector.games() {
        if clear {
            let removed = reset(conn, game)?;
            log::info!("{game}: removed {removed} draws");
        }

        let draws = generate_sample_draws(game, years, today, &mut rng)?;
        let pb = ProgressBar::new(draws.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("{msg} [{bar:40.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("=> "),
        );
        pb.set_message(game.label());

        let report = ingest_draws(conn, game, pb.wrap_iter(draws.into_iter().map(Ok::<_, LottoError>)))?;
        pb.finish_and_clear();
        display_ingest_summary(game, &report);
    }
    Ok(())
}

fn cmd_scrape(conn: &Connection, selector: GameSelector, config: &ScrapeConfig) -> Result<()> {
    let source = HttpSource::new(config)?;

    for (i, game) in selector.games().into_iter().enumerate() {
        if i > 0 && !config.delay().is_zero() {
            std::thread::sleep(config.delay());
        }

        let pb = ProgressBar::new_spinner();
        pb.set_message(format!("Scraping {}...", game));
        pb.enable_steady_tick(Duration::from_millis(120));
        let report = scrape_game(conn, game, &source, config);
        pb.finish_and_clear();

        let report = report.with_context(|| format!("Scraping {} failed", game))?;
        display_ingest_summary(game, &report);
    }
    Ok(())
}

fn cmd_import(conn: &Connection, selector: GameSelector, file: &PathBuf) -> Result<()> {
    let game = match selector.games().as_slice() {
        [game] => *game,
        _ => bail!("Import needs a single game: --game 649 or --game max"),
    };
    let report = import_csv(conn, game, file)?;
    display_ingest_summary(game, &report);
    Ok(())
}

fn cmd_analyze(conn: &Connection, selector: GameSelector, top: Option<usize>, seed: Option<u64>) -> Result<()> {
    let mut rng = make_rng(seed);

    for game in selector.games() {
        if count_draws(conn, game)? == 0 {
            println!("No {} data. Run first: lottoscan sample (or lottoscan scrape)", game);
            continue;
        }
        let analysis = analyze_game(conn, game, top, &mut rng)
            .with_context(|| format!("Analysis of {} failed", game))?;
        display_analysis(&analysis);
    }
    Ok(())
}

fn cmd_list(conn: &Connection, selector: GameSelector, last: u32) -> Result<()> {
    for game in selector.games() {
        let draws = fetch_last_draws(conn, game, last)?;
        display_draws(game, &draws);
    }
    Ok(())
}

fn cmd_reset(conn: &Connection, selector: GameSelector) -> Result<()> {
    for game in selector.games() {
        let removed = reset(conn, game)?;
        println!("{}: {} draws removed.", game, removed);
    }
    Ok(())
}
