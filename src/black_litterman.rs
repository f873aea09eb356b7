//! # Black-Litterman
//!
//! $$
//! \mu_{BL} = \left[(\tau\Sigma)^{-1} + P^\top\Omega^{-1}P\right]^{-1}
//! \left[(\tau\Sigma)^{-1}\pi + P^\top\Omega^{-1}q\right],
//! \qquad \Omega = \operatorname{diag}(\tau / c_k)
//! $$
//!
//! Bayesian blend of equilibrium returns $\pi$ with views $q$. The default
//! entry point uses one absolute view per asset ($P = I$); an explicit pick
//! matrix is accepted through [`blend_with_pick_matrix`].
//!
//! Since $\Omega$ scales with $\tau$, $\tau$ cancels out of the posterior mean:
//! the confidences alone decide how far it moves from $\pi$ towards $q$.

use nalgebra::DMatrix;
use nalgebra::DVector;
use tracing::debug;
use tracing::instrument;

use crate::assets::AssetValues;
use crate::error::Error;
use crate::error::Result;
use crate::linalg;
use crate::market::PriceTable;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlackLittermanConfig {
  /// Uncertainty scale of the prior.
  pub tau: f64,
}

impl Default for BlackLittermanConfig {
  fn default() -> Self {
    Self { tau: 0.025 }
  }
}

/// Posterior expected returns with one absolute view per asset.
///
/// `views`, `confidences` and the `prices` columns are matched to the
/// equilibrium tickers by name; the result follows the equilibrium order.
/// The covariance is the sample covariance of the one-period percentage
/// returns of `prices`.
#[instrument(skip_all, fields(assets = equilibrium.len(), tau = tau))]
pub fn black_litterman(
  equilibrium: &AssetValues,
  views: &AssetValues,
  confidences: &AssetValues,
  prices: &PriceTable,
  tau: f64,
) -> Result<AssetValues> {
  let prices = prices.aligned_to(equilibrium.tickers())?;
  let cov = prices.return_covariance()?;
  debug!(observations = prices.dates().len(), "return covariance estimated");
  blend_with_covariance(equilibrium, views, confidences, &cov, tau)
}

/// Same as [`black_litterman`] with a precomputed covariance whose rows and
/// columns follow the equilibrium order.
pub fn blend_with_covariance(
  equilibrium: &AssetValues,
  views: &AssetValues,
  confidences: &AssetValues,
  cov: &DMatrix<f64>,
  tau: f64,
) -> Result<AssetValues> {
  let order = equilibrium.tickers();
  let q = views.aligned_to(order)?;
  let c = confidences.aligned_to(order)?;
  let pick = DMatrix::<f64>::identity(order.len(), order.len());

  let posterior = blend_with_pick_matrix(equilibrium.values(), &pick, &q, &c, cov, tau)?;
  AssetValues::from_parts(order.to_vec(), posterior)
}

/// General form with a `k x n` pick matrix, `k` views and `k` confidences.
///
/// Rows of `pick` may express relative views, e.g. `[1, -1, 0]` for
/// "asset 0 outperforms asset 1 by `q`".
pub fn blend_with_pick_matrix(
  pi: &[f64],
  pick: &DMatrix<f64>,
  q: &[f64],
  confidences: &[f64],
  cov: &DMatrix<f64>,
  tau: f64,
) -> Result<Vec<f64>> {
  let n = pi.len();
  let k = q.len();
  if n == 0 {
    return Err(Error::InvalidInput("no assets to blend".into()));
  }
  if !tau.is_finite() || tau <= 0.0 {
    return Err(Error::InvalidInput(format!("tau must be positive, got {tau}")));
  }
  check_shape("covariance rows", n, cov.nrows())?;
  check_shape("covariance columns", n, cov.ncols())?;
  check_shape("pick matrix columns", n, pick.ncols())?;
  check_shape("pick matrix rows", k, pick.nrows())?;
  check_shape("view confidences", k, confidences.len())?;
  if pi.iter().chain(q).any(|v| !v.is_finite()) {
    return Err(Error::InvalidInput("returns and views must be finite".into()));
  }
  if let Some(c) = confidences.iter().find(|c| !c.is_finite() || **c <= 0.0) {
    return Err(Error::InvalidInput(format!(
      "view confidence must be positive, got {c}"
    )));
  }

  let pi = DVector::from_column_slice(pi);
  let q = DVector::from_column_slice(q);
  // Ω = diag(τ / c) is diagonal, so its inverse is taken entrywise
  let omega_inv = linalg::diagonal(&confidences.iter().map(|c| c / tau).collect::<Vec<_>>());

  let tau_cov_inv = linalg::invert(&(cov * tau), "tau * covariance")?;
  let pick_t_omega_inv = pick.transpose() * &omega_inv;

  let precision = &tau_cov_inv + &pick_t_omega_inv * pick;
  let m = linalg::invert(&precision, "posterior precision")?;
  let posterior = m * (&tau_cov_inv * &pi + &pick_t_omega_inv * &q);

  if posterior.iter().any(|v| !v.is_finite()) {
    return Err(Error::SingularMatrix("posterior precision"));
  }
  debug!(?posterior, "posterior returns");
  Ok(posterior.iter().copied().collect())
}

fn check_shape(context: &'static str, expected: usize, got: usize) -> Result<()> {
  if expected != got {
    return Err(Error::DimensionMismatch {
      context,
      expected,
      got,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use chrono::Days;
  use chrono::NaiveDate;

  use super::*;
  use crate::market::PriceBar;
  use crate::market::PriceSeries;

  const TAU: f64 = 0.025;

  fn walk(n: usize, ret: impl Fn(f64) -> f64) -> PriceSeries {
    let day0 = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut price = 100.0;
    let bars = (0..n)
      .map(|i| {
        if i > 0 {
          price *= 1.0 + ret(i as f64);
        }
        PriceBar::new(day0 + Days::new(i as u64), price, 1e6)
      })
      .collect();
    PriceSeries::new(bars)
  }

  fn series() -> [(&'static str, PriceSeries); 3] {
    [
      ("A", walk(80, |t| 0.010 * (0.7 * t).sin())),
      ("B", walk(80, |t| 0.012 * (1.3 * t).cos() + 0.003 * (0.2 * t).sin())),
      ("C", walk(80, |t| 0.008 * (2.9 * t + 1.0).sin() - 0.002)),
    ]
  }

  fn table(order: &[&str]) -> PriceTable {
    let all = series();
    PriceTable::from_series(order.iter().map(|t| {
      let (name, s) = all.iter().find(|(n, _)| n == t).unwrap();
      (*name, s)
    }))
    .unwrap()
  }

  fn values(pairs: &[(&str, f64)]) -> AssetValues {
    AssetValues::from_pairs(pairs.iter().copied()).unwrap()
  }

  fn equilibrium() -> AssetValues {
    values(&[("A", 0.03), ("B", 0.05), ("C", 0.02)])
  }

  fn views() -> AssetValues {
    values(&[("A", 0.10), ("B", -0.04), ("C", 0.06)])
  }

  fn uniform(c: f64) -> AssetValues {
    values(&[("A", c), ("B", c), ("C", c)])
  }

  #[test]
  fn views_at_equilibrium_leave_it_unchanged() {
    let pi = equilibrium();
    let conf = values(&[("A", 0.2), ("B", 0.9), ("C", 0.5)]);
    let posterior = black_litterman(&pi, &pi, &conf, &table(&["A", "B", "C"]), TAU).unwrap();

    assert_eq!(posterior.tickers(), pi.tickers());
    for (p, e) in posterior.values().iter().zip(pi.values()) {
      assert_abs_diff_eq!(*p, *e, epsilon = 1e-9);
    }
  }

  #[test]
  fn two_assets_in_agreement_do_not_move() {
    let pi = values(&[("A", 0.05), ("B", 0.08)]);
    let posterior = black_litterman(
      &pi,
      &values(&[("A", 0.05), ("B", 0.08)]),
      &values(&[("A", 0.01), ("B", 1.0)]),
      &table(&["A", "B"]),
      TAU,
    )
    .unwrap();

    assert_abs_diff_eq!(posterior.values()[0], 0.05, epsilon = 1e-9);
    assert_abs_diff_eq!(posterior.values()[1], 0.08, epsilon = 1e-9);
  }

  #[test]
  fn confident_views_dominate() {
    let posterior =
      black_litterman(&equilibrium(), &views(), &uniform(1e8), &table(&["A", "B", "C"]), TAU)
        .unwrap();

    for (p, q) in posterior.values().iter().zip(views().values()) {
      assert_abs_diff_eq!(*p, *q, epsilon = 1e-3);
    }
  }

  #[test]
  fn vague_views_fall_back_to_equilibrium() {
    let posterior =
      black_litterman(&equilibrium(), &views(), &uniform(1e-8), &table(&["A", "B", "C"]), TAU)
        .unwrap();

    for (p, e) in posterior.values().iter().zip(equilibrium().values()) {
      assert_abs_diff_eq!(*p, *e, epsilon = 1e-6);
    }
  }

  #[test]
  fn posterior_lies_between_prior_and_views_for_single_asset() {
    let pi = values(&[("A", 0.02)]);
    let q = values(&[("A", 0.12)]);
    let cov = DMatrix::from_element(1, 1, 0.04);
    let posterior = blend_with_covariance(&pi, &q, &values(&[("A", 1.0)]), &cov, TAU).unwrap();

    // with P = I and n = 1: mu = (pi / s + c q) / (1 / s + c)
    let expected = (0.02 / 0.04 + 0.12) / (1.0 / 0.04 + 1.0);
    assert_abs_diff_eq!(posterior.get("A").unwrap(), expected, epsilon = 1e-12);
    assert!(expected > 0.02 && expected < 0.12);
  }

  #[test]
  fn tau_cancels_out() {
    let conf = values(&[("A", 0.3), ("B", 0.6), ("C", 0.05)]);
    let prices = table(&["A", "B", "C"]);
    let a = black_litterman(&equilibrium(), &views(), &conf, &prices, 0.025).unwrap();
    let b = black_litterman(&equilibrium(), &views(), &conf, &prices, 0.5).unwrap();

    for (x, y) in a.values().iter().zip(b.values()) {
      assert_abs_diff_eq!(*x, *y, epsilon = 1e-9);
    }
  }

  #[test]
  fn output_follows_equilibrium_order() {
    let conf = values(&[("A", 0.3), ("B", 0.6), ("C", 0.05)]);
    let reference =
      black_litterman(&equilibrium(), &views(), &conf, &table(&["A", "B", "C"]), TAU).unwrap();

    let shuffled_views = values(&[("C", 0.06), ("A", 0.10), ("B", -0.04)]);
    let shuffled_conf = values(&[("B", 0.6), ("C", 0.05), ("A", 0.3)]);
    let shuffled = black_litterman(
      &equilibrium(),
      &shuffled_views,
      &shuffled_conf,
      &table(&["C", "A", "B"]),
      TAU,
    )
    .unwrap();

    assert_eq!(shuffled.tickers(), ["A", "B", "C"]);
    for (x, y) in reference.values().iter().zip(shuffled.values()) {
      assert_abs_diff_eq!(*x, *y, epsilon = 1e-12);
    }
  }

  #[test]
  fn identical_assets_make_covariance_singular() {
    let all = series();
    let prices = PriceTable::from_series([("A", &all[0].1), ("B", &all[0].1)]).unwrap();
    let pi = values(&[("A", 0.03), ("B", 0.05)]);

    assert_eq!(
      black_litterman(&pi, &pi, &values(&[("A", 0.5), ("B", 0.5)]), &prices, TAU),
      Err(Error::SingularMatrix("tau * covariance"))
    );
  }

  #[test]
  fn rejects_invalid_confidences_and_missing_views() {
    let prices = table(&["A", "B", "C"]);
    let zero = values(&[("A", 0.5), ("B", 0.0), ("C", 0.5)]);
    assert!(matches!(
      black_litterman(&equilibrium(), &views(), &zero, &prices, TAU),
      Err(Error::InvalidInput(_))
    ));

    let partial = values(&[("A", 0.1), ("B", 0.1), ("D", 0.1)]);
    assert_eq!(
      black_litterman(&equilibrium(), &partial, &uniform(0.5), &prices, TAU),
      Err(Error::MissingTicker("C".into()))
    );

    assert!(matches!(
      black_litterman(&equilibrium(), &views(), &uniform(0.5), &prices, 0.0),
      Err(Error::InvalidInput(_))
    ));
  }

  #[test]
  fn relative_view_through_pick_matrix() {
    let pi = [0.03, 0.05, 0.02];
    let cov = table(&["A", "B", "C"]).return_covariance().unwrap();
    // A outperforms B by 4%
    let pick = DMatrix::from_row_slice(1, 3, &[1.0, -1.0, 0.0]);
    let posterior = blend_with_pick_matrix(&pi, &pick, &[0.04], &[1e9], &cov, TAU).unwrap();

    assert_eq!(posterior.len(), 3);
    assert_abs_diff_eq!(posterior[0] - posterior[1], 0.04, epsilon = 1e-4);

    assert!(matches!(
      blend_with_pick_matrix(&pi, &pick, &[0.04, 0.01], &[1.0, 1.0], &cov, TAU),
      Err(Error::DimensionMismatch { .. })
    ));
  }
}
