use ndarray::{Array2, ArrayView2};

use crate::error::Result;
use crate::parsing::Dataset;

pub mod elm;
pub mod projection;
pub mod solver;

pub trait Model {
    fn fit(&mut self, dataset: &Dataset) -> Result<()>;
    fn predict(&self, instances: &ArrayView2<f64>) -> Result<Array2<f64>>;
}
