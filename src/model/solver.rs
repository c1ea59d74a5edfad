use log::debug;
use nalgebra::{linalg::SVD, DMatrix};
use ndarray::{Array2, ArrayView2};

use crate::error::{ElmError, Result};

// Budget of implicit QR sweeps per singular value before the SVD counts as diverged
const SVD_ITERATIONS_PER_DIM: usize = 75;

/// Moore-Penrose pseudo-inverse of "matrix" through its SVD.
/// Singular values at or below max_sv * max(rows, cols) * eps are treated as zero.
/// Returns the pseudo-inverse together with the number of singular values kept.
pub fn pseudo_inverse(matrix: &ArrayView2<f64>) -> Result<(Array2<f64>, usize)> {
    let (rows, cols) = matrix.dim();

    if matrix.iter().any(|x| !x.is_finite()) {
        return Err(ElmError::Numerical(
            "cannot decompose a matrix with non-finite entries".to_string(),
        ));
    }

    let dense = DMatrix::from_fn(rows, cols, |i, j| matrix[[i, j]]);
    let max_niter = SVD_ITERATIONS_PER_DIM * rows.min(cols).max(1);
    let svd = SVD::try_new(dense, true, true, f64::EPSILON, max_niter).ok_or_else(|| {
        ElmError::Numerical(format!(
            "SVD of a {}x{} matrix did not converge in {} iterations",
            rows, cols, max_niter
        ))
    })?;

    let max_singular_value = svd.singular_values.iter().cloned().fold(0f64, f64::max);
    let cutoff = max_singular_value * rows.max(cols) as f64 * f64::EPSILON;
    let rank = svd.singular_values.iter().filter(|&&s| s > cutoff).count();

    let pinv = svd
        .pseudo_inverse(cutoff)
        .map_err(|msg| ElmError::Numerical(msg.to_string()))?;

    Ok((
        Array2::from_shape_fn((pinv.nrows(), pinv.ncols()), |(i, j)| pinv[(i, j)]),
        rank,
    ))
}

/// Least-squares output weights for hidden activations H and targets Y: H⁺ Y
pub fn solve_output_weights(
    hidden: &ArrayView2<f64>,
    targets: &ArrayView2<f64>,
) -> Result<Array2<f64>> {
    if hidden.nrows() != targets.nrows() {
        return Err(ElmError::DimensionMismatch {
            context: "target sample count",
            expected: hidden.nrows(),
            actual: targets.nrows(),
        });
    }

    if targets.iter().any(|y| !y.is_finite()) {
        return Err(ElmError::Numerical("targets contain non-finite values".to_string()));
    }

    let (pinv, rank) = pseudo_inverse(hidden)?;

    debug!(
        "pseudo-inverse of {}x{} hidden activations kept {} singular values",
        hidden.nrows(),
        hidden.ncols(),
        rank
    );

    Ok(pinv.dot(targets))
}
