use log::debug;

use crate::error::{Error, Result};
use crate::layers::dense::Layer;
use crate::loss::cost_function::CostFunction;
use crate::network::network::Network;
use crate::network::state::DerivativeInput;
use crate::observe::NetworkObserver;

pub const DEFAULT_LEARNING_RATE: f64 = 0.05;

/// Staged construction of a [`Network`].
///
/// ```rust
/// use perceptra::{ActivationFunction, CostFunction, Initializer, Layer, Network};
///
/// # fn main() -> perceptra::Result<()> {
/// let network = Network::builder(Layer::new(784, 16, ActivationFunction::Sigmoid, Initializer::XavierNormal)?)
///     .add_layer(Layer::new(16, 10, ActivationFunction::Sigmoid, Initializer::XavierNormal)?)
///     .learning_rate(0.05)
///     .cost_function(CostFunction::HalfQuadratic)
///     .build()?;
/// assert_eq!(network.output_count(), 10);
/// # Ok(())
/// # }
/// ```
pub struct NetworkBuilder {
    layers: Vec<Layer>,
    cost_function: CostFunction,
    learning_rate: f64,
    derivative_input: DerivativeInput,
    observer: Option<Box<dyn NetworkObserver>>,
}

impl NetworkBuilder {
    /// Starts a pipeline whose input size is `input_layer.input_count()`.
    pub fn new(input_layer: Layer) -> NetworkBuilder {
        NetworkBuilder {
            layers: vec![input_layer],
            cost_function: CostFunction::default(),
            learning_rate: DEFAULT_LEARNING_RATE,
            derivative_input: DerivativeInput::default(),
            observer: None,
        }
    }

    pub fn add_layer(mut self, layer: Layer) -> NetworkBuilder {
        self.layers.push(layer);
        self
    }

    pub fn add_layers<I: IntoIterator<Item = Layer>>(mut self, layers: I) -> NetworkBuilder {
        self.layers.extend(layers);
        self
    }

    pub fn learning_rate(mut self, learning_rate: f64) -> NetworkBuilder {
        self.learning_rate = learning_rate;
        self
    }

    pub fn cost_function(mut self, cost_function: CostFunction) -> NetworkBuilder {
        self.cost_function = cost_function;
        self
    }

    pub fn derivative_input(mut self, derivative_input: DerivativeInput) -> NetworkBuilder {
        self.derivative_input = derivative_input;
        self
    }

    pub fn observer<O: NetworkObserver + 'static>(mut self, observer: O) -> NetworkBuilder {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Validates the topology and freezes it.
    ///
    /// Fails with `TopologyMismatch` when a layer's `input_count` differs
    /// from the previous layer's `neuron_count`, and with `InvalidArgument`
    /// for a non-finite or negative learning rate. On success every layer
    /// receives the builder's learning rate.
    pub fn build(mut self) -> Result<Network> {
        check_topology(&self.layers)?;
        if !self.learning_rate.is_finite() || self.learning_rate < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "learning rate must be finite and >= 0, got {}",
                self.learning_rate
            )));
        }

        for layer in &mut self.layers {
            layer.set_learning_rate(self.learning_rate);
        }

        debug!(
            "built network: {} layers, {} -> {}, cost {:?}, learning rate {}",
            self.layers.len(),
            self.layers[0].input_count(),
            self.layers[self.layers.len() - 1].neuron_count(),
            self.cost_function,
            self.learning_rate
        );

        Ok(Network::from_validated(
            self.layers,
            self.cost_function,
            self.learning_rate,
            self.derivative_input,
            self.observer,
        ))
    }
}

pub(crate) fn check_topology(layers: &[Layer]) -> Result<()> {
    for (index, pair) in layers.windows(2).enumerate() {
        if pair[1].input_count() != pair[0].neuron_count() {
            return Err(Error::TopologyMismatch {
                index: index + 1,
                input_count: pair[1].input_count(),
                previous_neurons: pair[0].neuron_count(),
            });
        }
    }
    Ok(())
}
