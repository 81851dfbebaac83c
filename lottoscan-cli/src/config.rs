use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use lottoscan_db::models::Game;

pub const LOTTO649_URL: &str = "https://www.olg.ca/en/lottery/play-lotto-649-encore/past-results.html";
pub const LOTTOMAX_URL: &str = "https://www.olg.ca/en/lottery/play-lotto-max-encore/past-results.html";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Scraper settings. Loadable from JSON; missing keys fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub lotto649_urls: Vec<String>,
    pub lottomax_urls: Vec<String>,
    pub user_agent: String,
    /// Politeness pause between two page requests.
    pub delay_ms: u64,
    /// Total tries per page, first attempt included.
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            lotto649_urls: vec![LOTTO649_URL.to_string()],
            lottomax_urls: vec![LOTTOMAX_URL.to_string()],
            user_agent: USER_AGENT.to_string(),
            delay_ms: 2000,
            max_attempts: 3,
            retry_delay_ms: 1000,
            timeout_secs: 30,
        }
    }
}

impl ScrapeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {:?}", path))?;
        let config: ScrapeConfig = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config {:?}", path))?;
        Ok(config)
    }

    pub fn urls(&self, game: Game) -> &[String] {
        match game {
            Game::Lotto649 => &self.lotto649_urls,
            Game::LottoMax => &self.lottomax_urls,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
