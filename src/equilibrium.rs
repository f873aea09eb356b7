//! # Equilibrium Returns
//!
//! $$
//! \pi_i = \frac{\mathrm{cap}_i}{\sum_j \mathrm{cap}_j}\, r_{\text{index}}
//! $$
//!
//! Market-implied prior returns from capitalisation weights.

use tracing::debug;

use crate::assets::AssetValues;
use crate::error::Error;
use crate::error::Result;
use crate::market::MarketDataProvider;

/// Market-cap weighted share of `index_return` for every asset.
pub fn equilibrium_returns(market_caps: &AssetValues, index_return: f64) -> Result<AssetValues> {
  if market_caps.is_empty() {
    return Err(Error::InvalidInput("no market capitalisations given".into()));
  }
  if let Some((ticker, cap)) = market_caps.iter().find(|(_, c)| !c.is_finite() || *c < 0.0) {
    return Err(Error::InvalidInput(format!(
      "market cap of {ticker} must be finite and non-negative, got {cap}"
    )));
  }

  let total: f64 = market_caps.values().iter().sum();
  if !total.is_finite() || total <= 0.0 {
    return Err(Error::InvalidInput(format!(
      "total market cap must be positive, got {total}"
    )));
  }

  AssetValues::from_pairs(
    market_caps
      .iter()
      .map(|(t, cap)| (t, cap / total * index_return)),
  )
}

/// Capitalisations of `tickers` in the given order. The first provider
/// failure is returned as is.
pub fn fetch_market_caps<P, S>(provider: &P, tickers: &[S]) -> Result<AssetValues>
where
  P: MarketDataProvider + ?Sized,
  S: AsRef<str>,
{
  let mut caps = AssetValues::new();
  for ticker in tickers {
    let ticker = ticker.as_ref();
    let cap = provider.market_cap(ticker)?;
    debug!(ticker, cap, "market cap");
    caps.insert(ticker, cap)?;
  }
  Ok(caps)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::market::InMemoryProvider;

  fn caps(pairs: &[(&str, f64)]) -> AssetValues {
    AssetValues::from_pairs(pairs.iter().copied()).unwrap()
  }

  #[test]
  fn splits_index_return_by_cap_weight() {
    let pi = equilibrium_returns(&caps(&[("A", 300.0), ("B", 700.0)]), 0.10).unwrap();

    assert_eq!(pi.tickers(), ["A", "B"]);
    assert_abs_diff_eq!(pi.get("A").unwrap(), 0.03, epsilon = 1e-12);
    assert_abs_diff_eq!(pi.get("B").unwrap(), 0.07, epsilon = 1e-12);
  }

  #[test]
  fn sums_to_index_return_and_ignores_cap_scale() {
    let base = caps(&[("X", 1.2e12), ("Y", 3.4e11), ("Z", 8.0e10)]);
    let scaled = caps(&[("X", 1.2e3), ("Y", 3.4e2), ("Z", 8.0e1)]);
    let a = equilibrium_returns(&base, 0.08).unwrap();
    let b = equilibrium_returns(&scaled, 0.08).unwrap();

    assert_abs_diff_eq!(a.values().iter().sum::<f64>(), 0.08, epsilon = 1e-12);
    for (x, y) in a.values().iter().zip(b.values()) {
      assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
    }
  }

  #[test]
  fn rejects_degenerate_caps() {
    assert!(matches!(
      equilibrium_returns(&caps(&[("A", 0.0), ("B", 0.0)]), 0.1),
      Err(Error::InvalidInput(_))
    ));
    assert!(matches!(
      equilibrium_returns(&caps(&[("A", f64::NAN)]), 0.1),
      Err(Error::InvalidInput(_))
    ));
    assert!(equilibrium_returns(&AssetValues::new(), 0.1).is_err());
  }

  #[test]
  fn fetch_propagates_provider_errors() {
    let provider = InMemoryProvider::new()
      .with_market_cap("A", 300.0)
      .with_market_cap("B", 700.0);

    let fetched = fetch_market_caps(&provider, &["B", "A"]).unwrap();
    assert_eq!(fetched.tickers(), ["B", "A"]);
    assert_eq!(fetched.values(), [700.0, 300.0]);

    assert_eq!(
      fetch_market_caps(&provider, &["A", "C"]),
      Err(Error::data_unavailable("C", "no market capitalisation"))
    );
  }
}
