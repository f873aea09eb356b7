use ndarray::Array1;

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
  let n = y_true.len();
  if n == 0 || n != y_pred.len() {
    return f64::NAN;
  }
  let mean = y_true.sum() / n as f64;
  let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();
  let ss_res: f64 = y_true
    .iter()
    .zip(y_pred.iter())
    .map(|(t, p)| (t - p).powi(2))
    .sum();

  if ss_tot == 0.0 {
    if ss_res == 0.0 {
      1.0
    } else {
      0.0
    }
  } else {
    1.0 - ss_res / ss_tot
  }
}

pub fn rmse(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
  let n = y_true.len();
  if n == 0 || n != y_pred.len() {
    return f64::NAN;
  }
  let mse = y_true
    .iter()
    .zip(y_pred.iter())
    .map(|(t, p)| (t - p).powi(2))
    .sum::<f64>()
    / n as f64;
  mse.sqrt()
}
