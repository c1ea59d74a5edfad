use log::debug;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::projection::RandomProjection;
use super::solver::solve_output_weights;
use super::Model;
use crate::error::{ElmError, Result};
use crate::parsing::Dataset;

pub const DEFAULT_HIDDEN_LAYER_SIZE: usize = 500;

/// Hyperparams of an ELM
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElmConfig {
    pub hidden_layer_size: usize,
    pub seed: Option<u64>, // None draws the projection from OS entropy
}

impl Default for ElmConfig {
    fn default() -> Self {
        ElmConfig {
            hidden_layer_size: DEFAULT_HIDDEN_LAYER_SIZE,
            seed: None,
        }
    }
}

/// Everything a successful training call produces. Replaced as a whole so a
/// failed retrain never leaves a mix of old and new weights behind.
#[derive(Debug, Clone)]
struct TrainedState {
    projection: RandomProjection,
    output_weights: Array2<f64>, // hidden x outputs
}

/// Extreme Learning Machine: a random, fixed hidden layer followed by
/// output weights solved in closed form with a pseudo-inverse
#[derive(Debug, Clone)]
pub struct Elm {
    hidden_layer_size: usize,
    rng: StdRng,
    state: Option<TrainedState>,
}

impl Elm {
    /// Construct an untrained ELM whose projection is drawn from OS entropy
    pub fn new(hidden_layer_size: usize) -> Result<Elm> {
        Elm::with_rng(hidden_layer_size, StdRng::from_entropy())
    }

    /// Construct an untrained ELM with a reproducible projection
    pub fn with_seed(hidden_layer_size: usize, seed: u64) -> Result<Elm> {
        Elm::with_rng(hidden_layer_size, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &ElmConfig) -> Result<Elm> {
        match config.seed {
            Some(seed) => Elm::with_seed(config.hidden_layer_size, seed),
            None => Elm::new(config.hidden_layer_size),
        }
    }

    fn with_rng(hidden_layer_size: usize, rng: StdRng) -> Result<Elm> {
        if hidden_layer_size == 0 {
            return Err(ElmError::InvalidConfig(
                "hidden layer size must be positive".to_string(),
            ));
        }

        Ok(Elm {
            hidden_layer_size,
            rng,
            state: None,
        })
    }

    pub fn hidden_layer_size(&self) -> usize {
        self.hidden_layer_size
    }

    pub fn is_trained(&self) -> bool {
        self.state.is_some()
    }

    /// Number of features the model was trained on
    pub fn num_features(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.projection.num_features())
    }

    pub fn num_outputs(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.output_weights.ncols())
    }

    pub fn input_weights(&self) -> Option<&Array2<f64>> {
        self.state.as_ref().map(|s| &s.projection.weights)
    }

    pub fn biases(&self) -> Option<&Array1<f64>> {
        self.state.as_ref().map(|s| &s.projection.biases)
    }

    pub fn output_weights(&self) -> Option<&Array2<f64>> {
        self.state.as_ref().map(|s| &s.output_weights)
    }

    /// Fit the model. Each instance is a row in "inputs", with its targets in the same row of "targets".
    /// A fresh projection is drawn from the model's own random source.
    pub fn train(&mut self, inputs: &ArrayView2<f64>, targets: &ArrayView2<f64>) -> Result<()> {
        let state = fit_state(self.hidden_layer_size, inputs, targets, &mut self.rng)?;
        self.state = Some(state);

        Ok(())
    }

    /// Same as train, but the projection is drawn from a caller supplied random source
    pub fn train_with_rng<R: Rng + ?Sized>(
        &mut self,
        inputs: &ArrayView2<f64>,
        targets: &ArrayView2<f64>,
        rng: &mut R,
    ) -> Result<()> {
        let state = fit_state(self.hidden_layer_size, inputs, targets, rng)?;
        self.state = Some(state);

        Ok(())
    }

    /// Fit a model with a single output per instance
    pub fn train_single_output(
        &mut self,
        inputs: &ArrayView2<f64>,
        targets: &ArrayView1<f64>,
    ) -> Result<()> {
        self.train(inputs, &targets.view().insert_axis(Axis(1)))
    }

    /// Hidden layer activations for a batch of instances, using the trained projection
    pub fn hidden_activations(&self, inputs: &ArrayView2<f64>) -> Result<Array2<f64>> {
        self.trained()?.projection.forward(inputs)
    }

    /// Predict the outputs of a single instance
    pub fn predict_one(&self, instance: &ArrayView1<f64>) -> Result<Array1<f64>> {
        let batch = instance.view().insert_axis(Axis(0));
        let predictions = self.predict(&batch)?;

        Ok(predictions.row(0).to_owned())
    }

    fn trained(&self) -> Result<&TrainedState> {
        self.state.as_ref().ok_or(ElmError::Untrained)
    }
}

impl Model for Elm {
    fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        self.train(&dataset.data.view(), &dataset.target.view())
    }

    /// Predict the outputs for a set of instances - each instance is a row in "instances"
    fn predict(&self, instances: &ArrayView2<f64>) -> Result<Array2<f64>> {
        let state = self.trained()?;
        let hidden = state.projection.forward(instances)?;

        debug!("predicting {} instances", instances.nrows());

        Ok(hidden.dot(&state.output_weights))
    }
}

/// Draw a projection, run the forward pass and solve for the output weights.
/// Nothing is written to the model here, so a failure keeps the previous state intact.
fn fit_state<R: Rng + ?Sized>(
    hidden_layer_size: usize,
    inputs: &ArrayView2<f64>,
    targets: &ArrayView2<f64>,
    rng: &mut R,
) -> Result<TrainedState> {
    let (num_samples, num_features) = inputs.dim();

    if num_samples == 0 {
        return Err(ElmError::EmptyData("no training instances".to_string()));
    }
    if num_features == 0 {
        return Err(ElmError::EmptyData("instances have no features".to_string()));
    }
    if targets.nrows() != num_samples {
        return Err(ElmError::DimensionMismatch {
            context: "target sample count",
            expected: num_samples,
            actual: targets.nrows(),
        });
    }

    let projection = RandomProjection::draw(num_features, hidden_layer_size, rng);

    debug!(
        "training on {} instances: {} features -> {} hidden -> {} outputs",
        num_samples,
        num_features,
        hidden_layer_size,
        targets.ncols()
    );

    let hidden = projection.forward(inputs)?;
    let output_weights = solve_output_weights(&hidden.view(), targets)?;

    Ok(TrainedState {
        projection,
        output_weights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn zero_hidden_units_is_rejected() {
        assert!(matches!(Elm::new(0), Err(ElmError::InvalidConfig(_))));
    }

    #[test]
    fn default_config_uses_500_hidden_units() {
        let model = Elm::from_config(&ElmConfig::default()).unwrap();

        assert_eq!(model.hidden_layer_size(), 500);
        assert!(!model.is_trained());
    }

    #[test]
    fn untrained_model_refuses_to_predict() {
        let model = Elm::with_seed(10, 0).unwrap();
        let inputs = array![[0.0, 1.0]];

        assert!(matches!(model.predict(&inputs.view()), Err(ElmError::Untrained)));
        assert!(matches!(
            model.predict_one(&inputs.row(0)),
            Err(ElmError::Untrained)
        ));
        assert!(model.input_weights().is_none());
        assert!(model.output_weights().is_none());
    }

    #[test]
    fn training_populates_weight_shapes() {
        let mut model = Elm::with_seed(30, 1).unwrap();
        let inputs = array![[0.1, 0.2, 0.3], [0.4, 0.5, 0.6], [0.7, 0.8, 0.9], [1.0, 0.0, 1.0]];
        let targets = array![[1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, 0.5]];

        model.train(&inputs.view(), &targets.view()).unwrap();

        assert_eq!(model.input_weights().unwrap().dim(), (3, 30));
        assert_eq!(model.biases().unwrap().len(), 30);
        assert_eq!(model.output_weights().unwrap().dim(), (30, 2));
        assert_eq!(model.num_features(), Some(3));
        assert_eq!(model.num_outputs(), Some(2));
    }

    #[test]
    fn sample_count_mismatch_is_rejected() {
        let mut model = Elm::with_seed(10, 2).unwrap();
        let inputs = Array2::<f64>::ones((4, 2));
        let targets = Array1::<f64>::ones(3);

        assert!(matches!(
            model.train_single_output(&inputs.view(), &targets.view()),
            Err(ElmError::DimensionMismatch { expected: 4, actual: 3, .. })
        ));
        assert!(!model.is_trained());
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let mut model = Elm::with_seed(10, 2).unwrap();
        let inputs = Array2::<f64>::zeros((0, 2));
        let targets = Array2::<f64>::zeros((0, 1));

        assert!(matches!(
            model.train(&inputs.view(), &targets.view()),
            Err(ElmError::EmptyData(_))
        ));
    }

    #[test]
    fn predict_one_matches_batch_row() {
        let mut model = Elm::with_seed(40, 9).unwrap();
        let inputs = array![[0.0, 0.5], [0.25, 1.0], [1.0, 0.75]];
        let targets = array![0.5, 1.25, 1.75];
        model.train_single_output(&inputs.view(), &targets.view()).unwrap();

        let batch = model.predict(&inputs.view()).unwrap();
        let single = model.predict_one(&inputs.row(1)).unwrap();

        assert_eq!(single.len(), 1);
        assert_abs_diff_eq!(single[0], batch[[1, 0]], epsilon = 1e-12);
    }

    #[test]
    fn same_seed_draws_same_projection() {
        let inputs = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let targets = array![1.0, 2.0, 3.0];
        let mut a = Elm::with_seed(25, 42).unwrap();
        let mut b = Elm::with_seed(25, 42).unwrap();

        a.train_single_output(&inputs.view(), &targets.view()).unwrap();
        b.train_single_output(&inputs.view(), &targets.view()).unwrap();

        assert_eq!(a.input_weights(), b.input_weights());
        assert_eq!(a.biases(), b.biases());
    }

    #[test]
    fn retraining_draws_a_new_projection() {
        let inputs = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let targets = array![1.0, 2.0, 3.0];
        let mut model = Elm::with_seed(25, 42).unwrap();

        model.train_single_output(&inputs.view(), &targets.view()).unwrap();
        let first = model.input_weights().unwrap().clone();
        model.train_single_output(&inputs.view(), &targets.view()).unwrap();

        assert_ne!(&first, model.input_weights().unwrap());
    }

    #[test]
    fn caller_supplied_rng_controls_the_projection() {
        let inputs = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let targets = array![[1.0], [2.0], [3.0]];
        let mut model = Elm::new(12).unwrap();

        model
            .train_with_rng(&inputs.view(), &targets.view(), &mut StdRng::seed_from_u64(7))
            .unwrap();
        let seeded = model.input_weights().unwrap().clone();
        model
            .train_with_rng(&inputs.view(), &targets.view(), &mut StdRng::seed_from_u64(7))
            .unwrap();
        assert_eq!(&seeded, model.input_weights().unwrap());

        model
            .train_with_rng(&inputs.view(), &targets.view(), &mut StdRng::seed_from_u64(8))
            .unwrap();
        assert_ne!(&seeded, model.input_weights().unwrap());
    }

    #[test]
    fn failed_retrain_keeps_previous_model() {
        let mut model = Elm::with_seed(20, 4).unwrap();
        let inputs = array![[0.0, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let targets = array![1.0, 2.0, 3.0];
        model.train_single_output(&inputs.view(), &targets.view()).unwrap();
        let before = model.predict(&inputs.view()).unwrap();
        let weights_before = model.input_weights().unwrap().clone();

        let bad_inputs = array![[f64::NAN, 1.0], [1.0, 0.0], [0.5, 0.5]];
        let result = model.train_single_output(&bad_inputs.view(), &targets.view());

        assert!(matches!(result, Err(ElmError::Numerical(_))));
        assert!(model.is_trained());
        assert_eq!(&weights_before, model.input_weights().unwrap());
        assert_eq!(before, model.predict(&inputs.view()).unwrap());
    }

    #[test]
    fn non_finite_targets_are_rejected() {
        let mut model = Elm::with_seed(20, 4).unwrap();
        let inputs = array![[0.0, 1.0], [1.0, 0.0]];
        let targets = array![1.0, f64::INFINITY];

        assert!(matches!(
            model.train_single_output(&inputs.view(), &targets.view()),
            Err(ElmError::Numerical(_))
        ));
    }
}
