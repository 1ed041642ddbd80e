use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::activation::{Activation, ActivationRegistry};
use crate::error::{Error, Result};
use crate::init::Initializer;
use crate::layers::dense::Layer;
use crate::loss::cost_function::CostFunction;
use crate::network::builder::DEFAULT_LEARNING_RATE;
use crate::network::network::Network;
use crate::network::state::DerivativeInput;

/// Describes one layer of a [`NetworkSpec`].
///
/// Fields:
/// - `input_count`: values feeding into this layer (the previous layer's
///   `neuron_count`, or the raw input size for the first layer)
/// - `neuron_count`: neurons in this layer
/// - `activation`: activation name, resolved through an [`ActivationRegistry`]
/// - `initializer`: weight initialisation scheme, `xavier_uniform` if omitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub input_count: usize,
    pub neuron_count: usize,
    pub activation: String,
    #[serde(default)]
    pub initializer: Initializer,
}

/// A serializable description of a network architecture and its training
/// hyperparameters, without any trained parameters.
///
/// ```json
/// {
///   "layers": [
///     { "input_count": 784, "neuron_count": 16, "activation": "sigmoid", "initializer": "xavier_normal" },
///     { "input_count": 16, "neuron_count": 10, "activation": "sigmoid" }
///   ],
///   "cost": "half_quadratic",
///   "learning_rate": 0.05
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Ordered list of layer descriptions (input → output).
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub cost: CostFunction,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub derivative_input: DerivativeInput,
}

fn default_learning_rate() -> f64 {
    DEFAULT_LEARNING_RATE
}

impl NetworkSpec {
    /// Describes the architecture of an existing network.
    ///
    /// Fails when a layer uses a custom activation under a built-in name,
    /// which [`build`](NetworkSpec::build) would resolve to the built-in.
    pub fn from_network(network: &Network) -> Result<NetworkSpec> {
        let mut layers = Vec::with_capacity(network.layers().len());
        for layer in network.layers() {
            if layer.activation().shadows_builtin() {
                return Err(Error::InvalidArgument(format!(
                    "custom activation uses the reserved name `{}`",
                    layer.activation().name()
                )));
            }
            layers.push(LayerSpec {
                input_count: layer.input_count(),
                neuron_count: layer.neuron_count(),
                activation: layer.activation().name().to_owned(),
                initializer: layer.initializer(),
            });
        }

        Ok(NetworkSpec {
            layers,
            cost: network.cost_function(),
            learning_rate: network.learning_rate(),
            derivative_input: network.derivative_input(),
        })
    }

    /// Builds a freshly initialised network. Activation names are looked up
    /// in `registry`; the topology is checked by the builder.
    pub fn build(&self, registry: &ActivationRegistry) -> Result<Network> {
        let mut layers = Vec::with_capacity(self.layers.len());
        for spec in &self.layers {
            let activation = registry.resolve(&spec.activation)?;
            layers.push(Layer::new(spec.input_count, spec.neuron_count, activation, spec.initializer)?);
        }

        let mut layers = layers.into_iter();
        let first = layers
            .next()
            .ok_or_else(|| Error::InvalidArgument("network spec must describe at least one layer".to_owned()))?;

        Network::builder(first)
            .add_layers(layers)
            .cost_function(self.cost)
            .learning_rate(self.learning_rate)
            .derivative_input(self.derivative_input)
            .build()
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MNIST_SPEC: &str = r#"{
        "layers": [
            { "input_count": 784, "neuron_count": 16, "activation": "sigmoid", "initializer": "zero" },
            { "input_count": 16, "neuron_count": 10, "activation": "sigmoid", "initializer": "zero" }
        ]
    }"#;

    #[test]
    fn omitted_fields_take_builder_defaults() {
        let spec: NetworkSpec = serde_json::from_str(MNIST_SPEC).unwrap();
        assert_eq!(spec.cost, CostFunction::HalfQuadratic);
        assert_eq!(spec.learning_rate, DEFAULT_LEARNING_RATE);
        assert_eq!(spec.derivative_input, DerivativeInput::Output);

        let network = spec.build(&ActivationRegistry::new()).unwrap();
        assert_eq!(network.input_count(), 784);
        assert_eq!(network.output_count(), 10);
        assert_eq!(NetworkSpec::from_network(&network).unwrap(), spec);
    }

    #[test]
    fn unknown_activation_is_reported() {
        let mut spec: NetworkSpec = serde_json::from_str(MNIST_SPEC).unwrap();
        spec.layers[1].activation = "softsign".to_owned();
        assert!(matches!(
            spec.build(&ActivationRegistry::new()),
            Err(Error::UnknownActivation(name)) if name == "softsign"
        ));
    }

    #[test]
    fn empty_and_mismatched_specs_fail() {
        let mut spec: NetworkSpec = serde_json::from_str(MNIST_SPEC).unwrap();
        spec.layers[1].input_count = 15;
        assert!(matches!(spec.build(&ActivationRegistry::new()), Err(Error::TopologyMismatch { index: 1, .. })));

        spec.layers.clear();
        assert!(matches!(spec.build(&ActivationRegistry::new()), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn json_file_round_trip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let spec: NetworkSpec = serde_json::from_str(MNIST_SPEC).unwrap();
        spec.save_json(file.path()).unwrap();
        assert_eq!(NetworkSpec::load_json(file.path()).unwrap(), spec);
    }
}
