//! # View Generator
//!
//! $$
//! q = \operatorname{clip}\left((1+\bar{\hat r}_{w})^{52}-1,\ -0.5,\ 2\right)
//! $$
//!
//! Per-asset pipeline from price history to an annualised view. Failures of
//! one asset are contained and turned into [`View::NEUTRAL`].

use rayon::prelude::*;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use super::trainer::train_view_model;
use super::trainer::TrainerConfig;
use super::types::View;
use super::types::ViewOutcome;
use super::types::ViewSet;
use crate::error::Result;
use crate::features::build_features;
use crate::features::FeatureConfig;
use crate::market::parse_window;
use crate::market::MarketDataProvider;
use crate::market::PriceSeries;
use crate::models::ModelKind;

#[derive(Clone, Debug)]
pub struct ViewGeneratorConfig {
  pub features: FeatureConfig,
  pub trainer: TrainerConfig,
  /// Fewer valid feature rows than this yields the neutral view.
  pub min_rows: usize,
  /// Compounding periods per year of the predicted return.
  pub periods_per_year: i32,
  pub min_annual_return: f64,
  pub max_annual_return: f64,
  /// Generate batch views on the rayon pool.
  pub parallel: bool,
}

impl Default for ViewGeneratorConfig {
  fn default() -> Self {
    Self {
      features: FeatureConfig::default(),
      trainer: TrainerConfig::default(),
      min_rows: 100,
      periods_per_year: 52,
      min_annual_return: -0.5,
      max_annual_return: 2.0,
      parallel: true,
    }
  }
}

/// Compound a per-period return to a yearly one.
pub fn annualize(period_return: f64, periods_per_year: i32) -> f64 {
  (1.0 + period_return).powi(periods_per_year) - 1.0
}

pub struct ViewGenerator<P> {
  provider: P,
  config: ViewGeneratorConfig,
}

impl<P: MarketDataProvider> ViewGenerator<P> {
  pub fn new(provider: P, config: ViewGeneratorConfig) -> Self {
    Self { provider, config }
  }

  pub fn config(&self) -> &ViewGeneratorConfig {
    &self.config
  }

  pub fn provider(&self) -> &P {
    &self.provider
  }

  /// View for `ticker` over `[start, end)`; never fails.
  pub fn generate(&self, ticker: &str, start: &str, end: &str, model: ModelKind) -> View {
    match self.try_generate(ticker, start, end, model) {
      Ok(outcome) => outcome.view(),
      Err(e) => {
        warn!(ticker, error = %e, "view generation failed, using neutral view");
        View::NEUTRAL
      }
    }
  }

  /// Like [`ViewGenerator::generate`] but surfaces errors.
  #[instrument(skip(self))]
  pub fn try_generate(
    &self,
    ticker: &str,
    start: &str,
    end: &str,
    model: ModelKind,
  ) -> Result<ViewOutcome> {
    let (start, end) = parse_window(start, end)?;
    let series = self.provider.price_history(ticker, start, end)?;
    self.from_series(ticker, &series, model)
  }

  /// Pipeline on an already retrieved history.
  pub fn from_series(
    &self,
    ticker: &str,
    series: &PriceSeries,
    model: ModelKind,
  ) -> Result<ViewOutcome> {
    let table = build_features(series, &self.config.features);
    if table.len() < self.config.min_rows {
      warn!(
        ticker,
        rows = table.len(),
        required = self.config.min_rows,
        "insufficient data"
      );
      return Ok(ViewOutcome::InsufficientData { rows: table.len() });
    }

    let report = train_view_model(
      &table.feature_matrix(),
      &table.targets(),
      model,
      &self.config.trainer,
    )?;

    let annual_return = annualize(report.mean_prediction, self.config.periods_per_year)
      .clamp(self.config.min_annual_return, self.config.max_annual_return);
    let view = View {
      annual_return,
      confidence: report.confidence,
    };

    info!(
      ticker,
      weekly_return = report.mean_prediction,
      annual_return,
      confidence = report.confidence,
      n_train = report.n_train,
      n_test = report.n_test,
      "view estimated"
    );
    Ok(ViewOutcome::Estimated { view, report })
  }

  /// Views for every ticker, in input order. Each asset is isolated: a
  /// failing ticker gets the neutral view and does not affect the others.
  pub fn generate_batch<S: AsRef<str> + Sync>(
    &self,
    tickers: &[S],
    start: &str,
    end: &str,
    model: ModelKind,
  ) -> ViewSet {
    let run = |t: &S| self.generate(t.as_ref(), start, end, model);
    let views: Vec<View> = if self.config.parallel {
      tickers.par_iter().map(run).collect()
    } else {
      tickers.iter().map(run).collect()
    };

    ViewSet {
      tickers: tickers.iter().map(|t| t.as_ref().to_string()).collect(),
      views,
    }
  }
}
