use chrono::NaiveDate;

use super::series::PriceSeries;
use crate::error::Error;
use crate::error::Result;

/// Source of historical prices and market capitalisations.
///
/// Implementations report missing data as [`Error::DataUnavailable`].
pub trait MarketDataProvider: Send + Sync {
  /// Adjusted close and volume history with `start <= date < end`.
  fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries>;

  /// Current market capitalisation.
  fn market_cap(&self, ticker: &str) -> Result<f64>;
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
  fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    (**self).price_history(ticker, start, end)
  }

  fn market_cap(&self, ticker: &str) -> Result<f64> {
    (**self).market_cap(ticker)
  }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Parse a `[start, end)` window, rejecting empty or reversed ranges.
pub fn parse_window(start: &str, end: &str) -> Result<(NaiveDate, NaiveDate)> {
  let start = parse_date(start)?;
  let end = parse_date(end)?;
  if start >= end {
    return Err(Error::InvalidInput(format!(
      "start date {start} must be before end date {end}"
    )));
  }
  Ok((start, end))
}
