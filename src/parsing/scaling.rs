use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{ElmError, Result};

/// Rescales every feature column to [0, 1] using the min and max seen when fitting
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    pub min: Array1<f64>,
    pub max: Array1<f64>,
}

impl MinMaxScaler {
    pub fn fit(data: &ArrayView2<f64>) -> Result<MinMaxScaler> {
        if data.nrows() == 0 {
            return Err(ElmError::EmptyData("cannot fit a scaler on zero instances".to_string()));
        }

        let min = data.fold_axis(Axis(0), f64::INFINITY, |acc, &x| acc.min(x));
        let max = data.fold_axis(Axis(0), f64::NEG_INFINITY, |acc, &x| acc.max(x));

        Ok(MinMaxScaler { min, max })
    }

    /// Scale the columns of "data". Constant columns map to 0.
    pub fn transform(&self, data: &ArrayView2<f64>) -> Result<Array2<f64>> {
        if data.ncols() != self.min.len() {
            return Err(ElmError::DimensionMismatch {
                context: "scaler feature count",
                expected: self.min.len(),
                actual: data.ncols(),
            });
        }

        let range = (&self.max - &self.min).mapv(|r| if r > 0f64 { r } else { 1f64 });

        Ok((data - &self.min) / &range)
    }

    pub fn fit_transform(data: &ArrayView2<f64>) -> Result<(MinMaxScaler, Array2<f64>)> {
        let scaler = MinMaxScaler::fit(data)?;
        let scaled = scaler.transform(data)?;

        Ok((scaler, scaled))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn columns_are_scaled_to_unit_interval() {
        let data = array![[1.0, -2.0, 5.0], [3.0, 2.0, 5.0], [2.0, 0.0, 5.0]];

        let (scaler, scaled) = MinMaxScaler::fit_transform(&data.view()).unwrap();

        assert_eq!(scaler.min, array![1.0, -2.0, 5.0]);
        assert_eq!(scaler.max, array![3.0, 2.0, 5.0]);
        assert_eq!(scaled, array![[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.5, 0.5, 0.0]]);
    }

    #[test]
    fn transform_rejects_other_feature_count() {
        let scaler = MinMaxScaler::fit(&array![[0.0, 1.0]].view()).unwrap();

        assert!(matches!(
            scaler.transform(&array![[0.0, 1.0, 2.0]].view()),
            Err(ElmError::DimensionMismatch { expected: 2, actual: 3, .. })
        ));
    }
}
