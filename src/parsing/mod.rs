use ndarray::{Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ElmError, Result};

pub mod scaling;
pub mod table;

/// Instances are rows of "data", with their targets in the same row of "target"
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub data: Array2<f64>,
    pub target: Array2<f64>,
}

impl Dataset {
    pub fn new(data: Array2<f64>, target: Array2<f64>) -> Result<Dataset> {
        if data.nrows() != target.nrows() {
            return Err(ElmError::DimensionMismatch {
                context: "target sample count",
                expected: data.nrows(),
                actual: target.nrows(),
            });
        }

        Ok(Dataset { data, target })
    }

    pub fn num_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_features(&self) -> usize {
        self.data.ncols()
    }

    /// Copy the given rows into a new dataset, in the given order
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            data: self.data.select(Axis(0), indices),
            target: self.target.select(Axis(0), indices),
        }
    }

    /// Shuffle the rows and split them into (train, test).
    /// The test set gets round(test_fraction * n) rows, clamped so both sides keep at least one.
    pub fn split<R: Rng + ?Sized>(&self, test_fraction: f64, rng: &mut R) -> Result<(Dataset, Dataset)> {
        if !(test_fraction > 0f64 && test_fraction < 1f64) {
            return Err(ElmError::InvalidConfig(format!(
                "test fraction must be in (0, 1), got {}",
                test_fraction
            )));
        }

        let n = self.num_samples();
        if n < 2 {
            return Err(ElmError::EmptyData(format!(
                "need at least 2 instances to split, got {}",
                n
            )));
        }

        let num_test = ((test_fraction * n as f64).round() as usize).clamp(1, n - 1);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);

        let (test_idx, train_idx) = indices.split_at(num_test);

        Ok((self.select(train_idx), self.select(test_idx)))
    }
}
