//! Yahoo Finance adapter.
//!
//! Prices come from the chart endpoint. The chart endpoint carries no market
//! capitalisation, so caps are supplied by the caller.

use std::collections::HashMap;

use anyhow::anyhow;
use anyhow::Context;
use chrono::DateTime;
use chrono::NaiveDate;
use time::OffsetDateTime;
use tracing::debug;
use yahoo_finance_api as yahoo;

use super::provider::MarketDataProvider;
use super::series::PriceBar;
use super::series::PriceSeries;
use crate::error::Error;
use crate::error::Result;

pub struct YahooProvider {
  connector: yahoo::YahooConnector,
  market_caps: HashMap<String, f64>,
}

impl YahooProvider {
  pub fn new() -> Result<Self> {
    let connector = yahoo::YahooConnector::new()
      .map_err(|e| Error::data_unavailable("*", format!("cannot create Yahoo connector: {e}")))?;
    Ok(Self {
      connector,
      market_caps: HashMap::new(),
    })
  }

  pub fn with_market_caps(mut self, caps: HashMap<String, f64>) -> Self {
    self.market_caps = caps;
    self
  }

  fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> anyhow::Result<PriceSeries> {
    let start = to_offset_datetime(start)?;
    let end = to_offset_datetime(end)?;
    let response = tokio_test::block_on(self.connector.get_quote_history(ticker, start, end))
      .with_context(|| format!("quote history request for {ticker} failed"))?;
    let quotes = response
      .quotes()
      .with_context(|| format!("malformed quote history for {ticker}"))?;

    let mut bars = Vec::with_capacity(quotes.len());
    for q in quotes {
      let date = DateTime::from_timestamp(q.timestamp as i64, 0)
        .ok_or_else(|| anyhow!("invalid timestamp {}", q.timestamp))?
        .date_naive();
      bars.push(PriceBar::new(date, q.adjclose, q.volume as f64));
    }
    debug!(ticker, bars = bars.len(), "fetched yahoo history");
    Ok(PriceSeries::new(bars))
  }
}

fn to_offset_datetime(date: NaiveDate) -> anyhow::Result<OffsetDateTime> {
  let ts = date
    .and_hms_opt(0, 0, 0)
    .ok_or_else(|| anyhow!("invalid date {date}"))?
    .and_utc()
    .timestamp();
  Ok(OffsetDateTime::from_unix_timestamp(ts)?)
}

impl MarketDataProvider for YahooProvider {
  fn price_history(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceSeries> {
    let series = self
      .fetch(ticker, start, end)
      .map_err(|e| Error::data_unavailable(ticker, format!("{e:#}")))?;
    if series.is_empty() {
      return Err(Error::data_unavailable(ticker, "empty quote history"));
    }
    Ok(series)
  }

  fn market_cap(&self, ticker: &str) -> Result<f64> {
    self
      .market_caps
      .get(ticker)
      .copied()
      .ok_or_else(|| Error::data_unavailable(ticker, "no market capitalisation configured"))
  }
}
