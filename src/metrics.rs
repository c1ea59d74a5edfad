use ndarray::ArrayView2;

use crate::error::{ElmError, Result};

/// Root-mean-square error over every output of every instance
pub fn rmse(predictions: &ArrayView2<f64>, targets: &ArrayView2<f64>) -> Result<f64> {
    if predictions.dim() != targets.dim() {
        return Err(ElmError::DimensionMismatch {
            context: "prediction element count",
            expected: targets.len(),
            actual: predictions.len(),
        });
    }
    if targets.is_empty() {
        return Err(ElmError::EmptyData("no predictions to score".to_string()));
    }

    let sum_sq: f64 = predictions
        .iter()
        .zip(targets.iter())
        .map(|(p, t)| (p - t).powi(2))
        .sum();

    Ok((sum_sq / targets.len() as f64).sqrt())
}
