//! # Return Engine
//!
//! $$
//! \mu_{BL} = \operatorname{BL}\left(\pi(\mathrm{cap}),\ q(\text{history}),\ c(\text{history}),\ \Sigma(\text{history})\right)
//! $$
//!
//! Single entry point running the whole estimation for an asset universe:
//! market caps → equilibrium, histories → views, both plus the joint price
//! table → posterior returns.

use tracing::info;
use tracing::instrument;

use crate::assets::AssetValues;
use crate::black_litterman::black_litterman;
use crate::black_litterman::BlackLittermanConfig;
use crate::equilibrium::equilibrium_returns;
use crate::equilibrium::fetch_market_caps;
use crate::error::Error;
use crate::error::Result;
use crate::market::parse_window;
use crate::market::MarketDataProvider;
use crate::market::PriceSeries;
use crate::market::PriceTable;
use crate::models::ModelKind;
use crate::views::ViewGenerator;
use crate::views::ViewGeneratorConfig;
use crate::views::ViewSet;

/// Runtime configuration for [`ReturnEngine`].
#[derive(Clone, Debug, Default)]
pub struct ReturnEngineConfig {
  pub views: ViewGeneratorConfig,
  pub black_litterman: BlackLittermanConfig,
  /// Model used for every asset's view.
  pub model: ModelKind,
}

/// Everything produced by one [`ReturnEngine::estimate`] run, in universe
/// order.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnEstimate {
  pub equilibrium: AssetValues,
  pub views: ViewSet,
  pub posterior: AssetValues,
}

pub struct ReturnEngine<P> {
  generator: ViewGenerator<P>,
  config: ReturnEngineConfig,
}

impl<P: MarketDataProvider> ReturnEngine<P> {
  pub fn new(provider: P, config: ReturnEngineConfig) -> Self {
    Self {
      generator: ViewGenerator::new(provider, config.views.clone()),
      config,
    }
  }

  pub fn config(&self) -> &ReturnEngineConfig {
    &self.config
  }

  pub fn provider(&self) -> &P {
    self.generator.provider()
  }

  /// Posterior expected returns of `tickers` over `[start, end)`.
  ///
  /// Missing market caps or price histories fail the whole run; a failing
  /// view only degrades that asset to the neutral view.
  #[instrument(skip_all, fields(assets = tickers.len(), model = %self.config.model))]
  pub fn estimate<S: AsRef<str> + Sync>(
    &self,
    tickers: &[S],
    start: &str,
    end: &str,
    index_return: f64,
  ) -> Result<ReturnEstimate> {
    if tickers.is_empty() {
      return Err(Error::InvalidInput("asset universe is empty".into()));
    }
    let (from, to) = parse_window(start, end)?;
    let provider = self.provider();

    let caps = fetch_market_caps(provider, tickers)?;
    let equilibrium = equilibrium_returns(&caps, index_return)?;

    let views = self
      .generator
      .generate_batch(tickers, start, end, self.config.model);

    let histories = tickers
      .iter()
      .map(|t| provider.price_history(t.as_ref(), from, to))
      .collect::<Result<Vec<PriceSeries>>>()?;
    let prices = PriceTable::from_series(
      tickers
        .iter()
        .map(|t| t.as_ref())
        .zip(histories.iter()),
    )?;

    let posterior = black_litterman(
      &equilibrium,
      &views.returns()?,
      &views.confidences()?,
      &prices,
      self.config.black_litterman.tau,
    )?;

    for (ticker, mu) in posterior.iter() {
      info!(
        ticker,
        equilibrium = equilibrium.get(ticker),
        posterior = mu,
        "expected return"
      );
    }
    Ok(ReturnEstimate {
      equilibrium,
      views,
      posterior,
    })
  }
}
