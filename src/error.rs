//! Error types shared across the crate.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;

/// Failure to turn text into a [`Period`](crate::period::Period).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("month must be in 1..=12, got {0}")]
    InvalidMonth(u8),

    #[error("year must be in 1..=9999, got {0}")]
    YearOutOfRange(i32),

    #[error("cannot parse billing period \"{0}\" (expected e.g. \"November 2025\" or \"2025-11\")")]
    Unparsable(String),
}

/// Errors raised while sourcing or exporting billing data.
///
/// The forecast engine itself never fails; these cover everything around it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Period(#[from] PeriodError),

    /// A CSV data row that parsed but carries unusable values.
    #[error("line {line}: {message}")]
    InvalidRecord { line: u64, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
