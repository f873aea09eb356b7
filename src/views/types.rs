use crate::assets::AssetValues;
use crate::error::Error;
use crate::error::Result;
use crate::models::ModelKind;

/// Annualised return prediction for one asset with its confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
  pub annual_return: f64,
  /// Clamped test-split R², always in `[0.01, 1.0]`.
  pub confidence: f64,
}

impl View {
  /// Result used when no model could be trained.
  pub const NEUTRAL: View = View {
    annual_return: 0.0,
    confidence: 0.1,
  };
}

/// Diagnostics of one fitted view model.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainReport {
  pub model: ModelKind,
  /// Mean prediction over the test split, in target units.
  pub mean_prediction: f64,
  /// Raw test-split R².
  pub r2: f64,
  pub confidence: f64,
  pub test_rmse: f64,
  pub n_train: usize,
  pub n_test: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewOutcome {
  Estimated { view: View, report: TrainReport },
  /// Fewer valid feature rows than required; no model was trained.
  InsufficientData { rows: usize },
}

impl ViewOutcome {
  pub fn view(&self) -> View {
    match self {
      ViewOutcome::Estimated { view, .. } => *view,
      ViewOutcome::InsufficientData { .. } => View::NEUTRAL,
    }
  }
}

/// Views of an asset universe, in universe order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewSet {
  pub tickers: Vec<String>,
  pub views: Vec<View>,
}

impl ViewSet {
  /// Annual returns by ticker. Fails on a repeated ticker.
  pub fn returns(&self) -> Result<AssetValues> {
    self.column(|v| v.annual_return)
  }

  /// Confidences by ticker. Fails on a repeated ticker.
  pub fn confidences(&self) -> Result<AssetValues> {
    self.column(|v| v.confidence)
  }

  fn column(&self, value: impl Fn(&View) -> f64) -> Result<AssetValues> {
    if self.tickers.len() != self.views.len() {
      return Err(Error::DimensionMismatch {
        context: "view set",
        expected: self.tickers.len(),
        got: self.views.len(),
      });
    }
    AssetValues::from_pairs(
      self
        .tickers
        .iter()
        .zip(&self.views)
        .map(|(t, v)| (t.as_str(), value(v))),
    )
  }

  pub fn get(&self, ticker: &str) -> Option<View> {
    self
      .tickers
      .iter()
      .position(|t| t == ticker)
      .map(|i| self.views[i])
  }
}
