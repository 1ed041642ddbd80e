use crate::activation::Activation;
use crate::data::dataset::DataSet;
use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::loss::cost_function::CostFunction;
use crate::math::{matrix::Matrix, vector};
use crate::network::builder::NetworkBuilder;
use crate::network::state::{DerivativeInput, NetworkState, TrainingProgress};
use crate::observe::{NetworkEvent, NetworkObserver};
use crate::train::{train_loop, TrainConfig, TrainReport};

/// An ordered pipeline of fully-connected layers sharing one cost function.
///
/// The layer sequence is fixed once built; only the parameters inside the
/// layers change, through training, restore or explicit assignment.
pub struct Network {
    pub(crate) layers: Vec<Layer>,
    pub(crate) cost_function: CostFunction,
    pub(crate) learning_rate: f64,
    pub(crate) derivative_input: DerivativeInput,
    pub(crate) state: NetworkState,
    pub(crate) progress: TrainingProgress,
    observer: Option<Box<dyn NetworkObserver>>,
}

/// Classification accuracy over a labelled dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
}

impl Network {
    pub fn builder(input_layer: Layer) -> NetworkBuilder {
        NetworkBuilder::new(input_layer)
    }

    pub(crate) fn from_validated(
        layers: Vec<Layer>,
        cost_function: CostFunction,
        learning_rate: f64,
        derivative_input: DerivativeInput,
        observer: Option<Box<dyn NetworkObserver>>,
    ) -> Network {
        Network {
            layers,
            cost_function,
            learning_rate,
            derivative_input,
            state: NetworkState::Ready,
            progress: TrainingProgress::default(),
            observer,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to one layer's parameters. Layers only expose
    /// shape-checked setters, so the topology cannot change through this.
    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers.get_mut(index)
    }

    pub fn input_layer(&self) -> &Layer {
        &self.layers[0]
    }

    pub fn output_layer(&self) -> &Layer {
        &self.layers[self.layers.len() - 1]
    }

    pub fn input_count(&self) -> usize {
        self.input_layer().input_count()
    }

    pub fn output_count(&self) -> usize {
        self.output_layer().neuron_count()
    }

    pub fn cost_function(&self) -> CostFunction {
        self.cost_function
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn derivative_input(&self) -> DerivativeInput {
        self.derivative_input
    }

    pub fn state(&self) -> NetworkState {
        self.state
    }

    pub fn progress(&self) -> TrainingProgress {
        self.progress
    }

    pub fn set_observer<O: NetworkObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    pub(crate) fn notify(&mut self, event: NetworkEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&event);
        }
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_count() {
            return Err(Error::mismatch("network input", self.input_count(), input.len()));
        }
        Ok(())
    }

    /// Runs `input` through every layer and returns the output activation.
    /// Nothing inside the network changes.
    pub fn predict(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        let mut current = input.to_vec();
        for layer in &self.layers {
            current = layer.evaluate(&current)?;
        }
        Ok(current)
    }

    /// Like [`predict`](Network::predict) but records every layer's
    /// activation, as a training step does.
    pub fn feed_forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        let mut current = input.to_vec();
        for layer in &mut self.layers {
            current = layer.activate(&current)?.to_vec();
        }
        Ok(current)
    }

    /// Index of the strongest output neuron.
    pub fn classify(&self, input: &[f64]) -> Result<usize> {
        let output = self.predict(input)?;
        vector::argmax(&output).ok_or_else(|| Error::mismatch("network output", 1, 0))
    }

    /// Counts correct classifications over the labelled samples of `dataset`.
    /// Unlabelled samples are skipped.
    pub fn evaluate(&self, dataset: &DataSet) -> Result<Evaluation> {
        let mut total = 0;
        let mut correct = 0;
        for sample in dataset.iter() {
            let Some(label) = sample.label() else { continue };
            total += 1;
            if self.classify(sample.input())? == label {
                correct += 1;
            }
        }
        let accuracy = if total == 0 { 0.0 } else { correct as f64 / total as f64 };
        Ok(Evaluation { total, correct, accuracy })
    }

    /// Trains on `dataset` for `epochs` passes, updating after every
    /// `batch_size` samples and flushing each epoch's partial batch.
    pub fn train(&mut self, dataset: &DataSet, batch_size: usize, epochs: usize) -> Result<TrainReport> {
        train_loop(self, dataset, &TrainConfig::new(batch_size, epochs))
    }

    pub fn train_with(&mut self, dataset: &DataSet, config: &TrainConfig) -> Result<TrainReport> {
        train_loop(self, dataset, config)
    }

    /// One training step: a recorded forward pass followed by
    /// backpropagation against `target`. Returns the output activation.
    pub(crate) fn feed_forward_with_target(&mut self, input: &[f64], target: &[f64]) -> Result<Vec<f64>> {
        if target.len() != self.output_count() {
            return Err(Error::mismatch("training target", self.output_count(), target.len()));
        }
        let output = self.feed_forward(input)?;
        self.backpropagate(input, target)?;
        Ok(output)
    }

    /// Walks the layers from output to input, accumulating each layer's
    /// gradient and propagating the error through its weights.
    fn backpropagate(&mut self, input: &[f64], target: &[f64]) -> Result<()> {
        let last = self.layers.len() - 1;
        let mut d_cost = self.cost_function.gradient(self.layers[last].last_output(), target)?;

        for i in (0..self.layers.len()).rev() {
            let delta_biases = {
                let layer = &self.layers[i];
                let at = match self.derivative_input {
                    DerivativeInput::Output => layer.last_output(),
                    DerivativeInput::PreActivation => layer.last_linear(),
                };
                vector::hadamard(&d_cost, &layer.activation().derivatives(at))?
            };

            let prev_activation = if i > 0 { self.layers[i - 1].last_output() } else { input };
            let delta_weights = Matrix::outer(&delta_biases, prev_activation);

            self.layers[i].accumulate_gradient(&delta_weights, &delta_biases)?;

            if i > 0 {
                d_cost = Matrix::vec_mat(&delta_biases, self.layers[i].weights())?;
            }
        }
        Ok(())
    }

    /// Applies every layer's pending update, input layer first.
    /// Returns whether any layer had something to apply.
    pub(crate) fn update(&mut self) -> bool {
        let mut applied = false;
        for layer in &mut self.layers {
            applied |= layer.apply_update();
        }
        applied
    }

    pub(crate) fn discard_gradients(&mut self) {
        for layer in &mut self.layers {
            layer.clear_gradients();
        }
    }

    pub(crate) fn has_pending_gradients(&self) -> bool {
        self.layers.iter().any(|l| l.accumulated_count() > 0)
    }
}
