use serde::{Serialize, Deserialize};

use crate::activation::{Activation, ActivationRegistry};
use crate::error::{Error, Result};
use crate::init::Initializer;
use crate::layers::dense::Layer;
use crate::loss::cost_function::CostFunction;
use crate::math::matrix::Matrix;
use crate::network::network::Network;
use crate::network::state::DerivativeInput;

/// Version written into every snapshot; decoding rejects any other value.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Stored parameters of one layer. Forward and gradient buffers are not
/// part of it; a restored layer starts with them zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSnapshot {
    pub neuron_count: usize,
    pub input_count: usize,
    pub activation: String,
    pub initializer: Initializer,
    /// `neuron_count` rows of `input_count` weights.
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

/// Everything needed to rebuild a network whose `predict` output matches
/// the original bit for bit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub format_version: u32,
    pub cost: CostFunction,
    pub learning_rate: f64,
    pub derivative_input: DerivativeInput,
    pub layers: Vec<LayerSnapshot>,
}

impl LayerSnapshot {
    /// Fails with `InvalidSnapshot` when the layer's activation is a custom
    /// one carrying a built-in name, since decoding would silently swap in
    /// the built-in.
    pub fn from_layer(layer: &Layer) -> Result<LayerSnapshot> {
        if layer.activation().shadows_builtin() {
            return Err(Error::InvalidSnapshot(format!(
                "custom activation uses the reserved name `{}`",
                layer.activation().name()
            )));
        }
        Ok(LayerSnapshot {
            neuron_count: layer.neuron_count(),
            input_count: layer.input_count(),
            activation: layer.activation().name().to_owned(),
            initializer: layer.initializer(),
            weights: layer.weights().iter_rows().map(<[f64]>::to_vec).collect(),
            biases: layer.biases().to_vec(),
        })
    }

    fn is_finite(&self) -> bool {
        self.weights.iter().flatten().chain(&self.biases).all(|v| v.is_finite())
    }

    fn into_layer(self, index: usize, registry: &ActivationRegistry, learning_rate: f64) -> Result<Layer> {
        if self.weights.len() != self.neuron_count {
            return Err(Error::InvalidSnapshot(format!(
                "layer {index}: {} weight rows for {} neurons",
                self.weights.len(),
                self.neuron_count
            )));
        }
        if let Some(row) = self.weights.iter().position(|r| r.len() != self.input_count) {
            return Err(Error::InvalidSnapshot(format!(
                "layer {index}: weight row {row} has {} values, expected {}",
                self.weights[row].len(),
                self.input_count
            )));
        }
        if self.biases.len() != self.neuron_count {
            return Err(Error::InvalidSnapshot(format!(
                "layer {index}: {} biases for {} neurons",
                self.biases.len(),
                self.neuron_count
            )));
        }

        let activation = registry.resolve(&self.activation)?;
        let weights = Matrix::from_rows(self.weights)?;
        Layer::from_parameters(weights, self.biases, activation, self.initializer, learning_rate)
    }
}

impl NetworkSnapshot {
    pub fn from_network(network: &Network) -> Result<NetworkSnapshot> {
        Ok(NetworkSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            cost: network.cost_function(),
            learning_rate: network.learning_rate(),
            derivative_input: network.derivative_input(),
            layers: network.layers().iter().map(LayerSnapshot::from_layer).collect::<Result<_>>()?,
        })
    }

    /// Index of the first layer holding a NaN or infinite weight or bias.
    pub fn first_non_finite_layer(&self) -> Option<usize> {
        self.layers.iter().position(|layer| !layer.is_finite())
    }

    /// Rebuilds the network, resolving activation names through `registry`.
    /// The restored pipeline goes through the same topology checks as a
    /// freshly built one.
    pub fn into_network(self, registry: &ActivationRegistry) -> Result<Network> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(Error::InvalidSnapshot(format!(
                "unsupported format version {} (expected {SNAPSHOT_FORMAT_VERSION})",
                self.format_version
            )));
        }

        let learning_rate = self.learning_rate;
        let mut layers = self
            .layers
            .into_iter()
            .enumerate()
            .map(|(index, layer)| layer.into_layer(index, registry, learning_rate))
            .collect::<Result<Vec<Layer>>>()?
            .into_iter();

        let first = layers
            .next()
            .ok_or_else(|| Error::InvalidSnapshot("snapshot holds no layers".to_owned()))?;

        Network::builder(first)
            .add_layers(layers)
            .cost_function(self.cost)
            .learning_rate(learning_rate)
            .derivative_input(self.derivative_input)
            .build()
    }
}
