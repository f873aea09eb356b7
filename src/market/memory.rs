use std::collections::HashMap;

use chrono::NaiveDate;

use super::provider::MarketDataProvider;
use super::series::PriceSeries;
use crate::error::Error;
use crate::error::Result;

/// Provider backed by preloaded data. Useful offline and in tests.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProvider {
  history: HashMap<String, PriceSeries>,
  market_caps: HashMap<String, f64>,
}

impl InMemoryProvider {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_history(mut self, ticker: impl Into<String>, series: PriceSeries) -> Self {
    self.history.insert(ticker.into(), series);
    self
  }

  pub fn with_market_cap(mut self, ticker: impl Into<String>, cap: f64) -> Self {
    self.market_caps.insert(ticker.into(), cap);
    self
  }
}

impl MarketDataProvider for InMemoryProvider {
  fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let series = self
      .history
      .get(ticker)
      .ok_or_else(|| Error::data_unavailable(ticker, "no price history"))?
      .between(start, end);
    if series.is_empty() {
      return Err(Error::data_unavailable(
        ticker,
        format!("no prices between {start} and {end}"),
      ));
    }
    Ok(series)
  }

  fn market_cap(&self, ticker: &str) -> Result<f64> {
    self
      .market_caps
      .get(ticker)
      .copied()
      .ok_or_else(|| Error::data_unavailable(ticker, "no market capitalisation"))
  }
}
