use ndarray::{Array1, Array2, ArrayView2};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{ElmError, Result};

/// The fixed random input-to-hidden layer of an ELM
#[derive(Debug, Clone)]
pub struct RandomProjection {
    pub weights: Array2<f64>, // features x hidden
    pub biases: Array1<f64>,  // hidden
}

impl RandomProjection {
    /// Draw every weight and bias independently from N(0, 1)
    pub fn draw<R: Rng + ?Sized>(
        num_features: usize,
        hidden_layer_size: usize,
        rng: &mut R,
    ) -> RandomProjection {
        let weights: Array2<f64> =
            Array2::from_shape_simple_fn((num_features, hidden_layer_size), || {
                StandardNormal.sample(&mut *rng)
            });
        let biases: Array1<f64> =
            Array1::from_shape_simple_fn(hidden_layer_size, || StandardNormal.sample(&mut *rng));

        RandomProjection { weights, biases }
    }

    pub fn num_features(&self) -> usize {
        self.weights.nrows()
    }

    pub fn hidden_layer_size(&self) -> usize {
        self.weights.ncols()
    }

    /// Project the inputs onto the hidden layer and activate: relu(X W + b)
    /// Each instance is a row in "inputs". Training and prediction both go through here.
    pub fn forward(&self, inputs: &ArrayView2<f64>) -> Result<Array2<f64>> {
        if inputs.ncols() != self.num_features() {
            return Err(ElmError::DimensionMismatch {
                context: "input feature count",
                expected: self.num_features(),
                actual: inputs.ncols(),
            });
        }

        let linear = inputs.dot(&self.weights) + &self.biases;

        Ok(linear.mapv_into(relu))
    }
}

/// Rectified linear unit. NaN is passed through instead of being clamped,
/// so the solver still sees it.
fn relu(z: f64) -> f64 {
    if z < 0f64 {
        0f64
    } else {
        z
    }
}
