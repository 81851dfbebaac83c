use thiserror::Error;

#[derive(Debug, Error)]
pub enum LottoError {
    /// A draw record or generated entry breaks the arity/range/duplicate rules.
    #[error("validation error: {0}")]
    Validation(String),

    /// A page fetch failed. Retried by the scraper, then the page is skipped.
    #[error("network error: {0}")]
    Network(String),

    /// The frequency data cannot produce a valid entry.
    #[error("generation error: {0}")]
    Generation(String),

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LottoError>;
