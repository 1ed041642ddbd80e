use rand::Rng;

use crate::activation::{Activation, ActivationFunction};
use crate::error::{Error, Result};
use crate::init::Initializer;
use crate::math::{matrix::Matrix, vector};

/// Learning rate a layer carries until a network builder overrides it.
pub const DEFAULT_LAYER_LEARNING_RATE: f64 = 0.5;

/// One fully-connected layer: `output = activation(weights · input + biases)`.
///
/// Besides its parameters the layer keeps the transient state needed for
/// training: the most recent forward activation (and the linear sums that
/// produced it) plus gradient accumulators. Accumulators grow with every
/// backward pass the network feeds in and are averaged, applied and cleared
/// together by [`apply_update`](Layer::apply_update).
#[derive(Debug, Clone)]
pub struct Layer {
    input_count: usize,
    neuron_count: usize,
    weights: Matrix,
    biases: Vec<f64>,
    activation: ActivationFunction,
    initializer: Initializer,
    learning_rate: f64,

    last_linear: Vec<f64>,
    last_output: Vec<f64>,
    grad_weights: Matrix,
    grad_biases: Vec<f64>,
    accumulated_count: usize,
}

impl Layer {
    /// Creates a layer and initialises it with the thread-local generator.
    pub fn new(
        input_count: usize,
        neuron_count: usize,
        activation: ActivationFunction,
        initializer: Initializer,
    ) -> Result<Layer> {
        Layer::with_rng(input_count, neuron_count, activation, initializer, &mut rand::thread_rng())
    }

    /// Creates a layer, drawing initial parameters from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(
        input_count: usize,
        neuron_count: usize,
        activation: ActivationFunction,
        initializer: Initializer,
        rng: &mut R,
    ) -> Result<Layer> {
        check_counts(input_count, neuron_count)?;

        let mut weights = Matrix::zeros(neuron_count, input_count);
        let mut biases = vec![0.0; neuron_count];
        initializer.initialize_with_rng(&mut weights, &mut biases, rng);

        Ok(Layer::assemble(weights, biases, activation, initializer, DEFAULT_LAYER_LEARNING_RATE))
    }

    /// Rebuilds a layer from stored parameters. Transient buffers start zeroed.
    pub fn from_parameters(
        weights: Matrix,
        biases: Vec<f64>,
        activation: ActivationFunction,
        initializer: Initializer,
        learning_rate: f64,
    ) -> Result<Layer> {
        check_counts(weights.cols(), weights.rows())?;
        if biases.len() != weights.rows() {
            return Err(Error::mismatch("layer biases", weights.rows(), biases.len()));
        }
        Ok(Layer::assemble(weights, biases, activation, initializer, learning_rate))
    }

    fn assemble(
        weights: Matrix,
        biases: Vec<f64>,
        activation: ActivationFunction,
        initializer: Initializer,
        learning_rate: f64,
    ) -> Layer {
        let (neuron_count, input_count) = weights.shape();
        Layer {
            input_count,
            neuron_count,
            weights,
            biases,
            activation,
            initializer,
            learning_rate,
            last_linear: vec![0.0; neuron_count],
            last_output: vec![0.0; neuron_count],
            grad_weights: Matrix::zeros(neuron_count, input_count),
            grad_biases: vec![0.0; neuron_count],
            accumulated_count: 0,
        }
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    pub fn activation(&self) -> &ActivationFunction {
        &self.activation
    }

    pub fn initializer(&self) -> Initializer {
        self.initializer
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    /// Output of the most recent recorded forward pass.
    pub fn last_output(&self) -> &[f64] {
        &self.last_output
    }

    /// Linear sums `z` behind [`last_output`](Layer::last_output).
    pub fn last_linear(&self) -> &[f64] {
        &self.last_linear
    }

    /// Number of gradient contributions waiting for the next update.
    pub fn accumulated_count(&self) -> usize {
        self.accumulated_count
    }

    /// Replaces the weight matrix; it must be `neuron_count × input_count`.
    pub fn set_weights(&mut self, weights: Matrix) -> Result<()> {
        if weights.rows() != self.neuron_count {
            return Err(Error::mismatch("layer weight rows", self.neuron_count, weights.rows()));
        }
        if weights.cols() != self.input_count {
            return Err(Error::mismatch("layer weight cols", self.input_count, weights.cols()));
        }
        self.weights = weights;
        Ok(())
    }

    pub fn set_biases(&mut self, biases: Vec<f64>) -> Result<()> {
        if biases.len() != self.neuron_count {
            return Err(Error::mismatch("layer biases", self.neuron_count, biases.len()));
        }
        self.biases = biases;
        Ok(())
    }

    pub(crate) fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    fn check_input(&self, input: &[f64]) -> Result<()> {
        if input.len() != self.input_count {
            return Err(Error::mismatch("layer input", self.input_count, input.len()));
        }
        Ok(())
    }

    fn linear(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut z = self.weights.mat_vec(input)?;
        z.iter_mut().zip(&self.biases).for_each(|(z, b)| *z += b);
        Ok(z)
    }

    /// Forward pass that leaves the layer untouched.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        self.check_input(input)?;
        let z = self.linear(input)?;
        Ok(self.activation.values(&z))
    }

    /// Forward pass that records `z` and the activation for backpropagation.
    pub fn activate(&mut self, input: &[f64]) -> Result<&[f64]> {
        self.check_input(input)?;
        let z = self.linear(input)?;
        self.last_output = self.activation.values(&z);
        self.last_linear = z;
        Ok(self.last_output.as_slice())
    }

    /// Adds one sample's gradient into the accumulators.
    ///
    /// Both shapes are checked before anything is added, so a rejected call
    /// leaves the accumulators and the count unchanged.
    pub(crate) fn accumulate_gradient(&mut self, delta_weights: &Matrix, delta_biases: &[f64]) -> Result<()> {
        if delta_weights.shape() != self.grad_weights.shape() {
            let (rows, cols) = delta_weights.shape();
            return Err(if rows != self.neuron_count {
                Error::mismatch("weight gradient rows", self.neuron_count, rows)
            } else {
                Error::mismatch("weight gradient cols", self.input_count, cols)
            });
        }
        if delta_biases.len() != self.neuron_count {
            return Err(Error::mismatch("bias gradient", self.neuron_count, delta_biases.len()));
        }

        self.grad_weights.add_assign(delta_weights)?;
        vector::add_assign(&mut self.grad_biases, delta_biases)?;
        self.accumulated_count += 1;
        Ok(())
    }

    /// Applies the averaged accumulated gradient and clears the accumulators:
    /// `w -= learning_rate · Σg / count`.
    ///
    /// Returns `false` without touching anything when nothing has been
    /// accumulated.
    pub(crate) fn apply_update(&mut self) -> bool {
        if self.accumulated_count == 0 {
            return false;
        }
        let scale = self.learning_rate / self.accumulated_count as f64;

        for (row, grad_row) in self.weights.rows_mut().zip(self.grad_weights.iter_rows()) {
            for (w, g) in row.iter_mut().zip(grad_row) {
                *w -= g * scale;
            }
        }
        for (b, g) in self.biases.iter_mut().zip(&self.grad_biases) {
            *b -= g * scale;
        }

        self.clear_gradients();
        true
    }

    /// Discards pending gradient contributions.
    pub(crate) fn clear_gradients(&mut self) {
        self.grad_weights.fill(0.0);
        self.grad_biases.iter_mut().for_each(|g| *g = 0.0);
        self.accumulated_count = 0;
    }
}

fn check_counts(input_count: usize, neuron_count: usize) -> Result<()> {
    if neuron_count == 0 {
        return Err(Error::InvalidDimension("neuron_count must be > 0".to_owned()));
    }
    if input_count == 0 {
        return Err(Error::InvalidDimension("input_count must be > 0".to_owned()));
    }
    Ok(())
}
