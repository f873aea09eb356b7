//! # Errors
//!
//! Crate-wide error type. Data and input problems are recoverable by the
//! caller; [`Error::SingularMatrix`] is a fatal numerical condition.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
  #[error("data unavailable for {ticker}: {reason}")]
  DataUnavailable { ticker: String, reason: String },

  #[error("invalid date '{0}', expected YYYY-MM-DD")]
  InvalidDate(String),

  #[error("invalid input: {0}")]
  InvalidInput(String),

  #[error("dimension mismatch in {context}: expected {expected}, got {got}")]
  DimensionMismatch {
    context: &'static str,
    expected: usize,
    got: usize,
  },

  #[error("ticker {0} is missing from one of the aligned inputs")]
  MissingTicker(String),

  #[error("matrix {0} is singular and cannot be inverted")]
  SingularMatrix(&'static str),

  #[error("unknown model type '{0}'")]
  UnknownModel(String),

  #[error("model error: {0}")]
  Model(String),
}

impl Error {
  pub fn data_unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
    Self::DataUnavailable {
      ticker: ticker.into(),
      reason: reason.into(),
    }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
