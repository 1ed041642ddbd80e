use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use crate::activation::{Activation, ActivationRegistry};
use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::persist::snapshot::NetworkSnapshot;

/// Extension required for binary network files.
pub const NETWORK_FILE_EXTENSION: &str = "net";

/// Encodes networks to JSON or compact binary and decodes them back.
///
/// A codec owns the [`ActivationRegistry`] used to resolve activation names
/// on the way in, so networks using custom activations can only be decoded
/// by a codec they were registered with.
#[derive(Debug, Clone, Default)]
pub struct NetworkCodec {
    registry: ActivationRegistry,
}

impl NetworkCodec {
    pub fn new() -> NetworkCodec {
        NetworkCodec::default()
    }

    pub fn with_registry(registry: ActivationRegistry) -> NetworkCodec {
        NetworkCodec { registry }
    }

    pub fn registry(&self) -> &ActivationRegistry {
        &self.registry
    }

    pub fn register_activation(&mut self, activation: Arc<dyn Activation>) -> Result<()> {
        self.registry.register(activation)
    }

    /// Human-readable projection: per layer the neuron and input counts,
    /// activation, initializer, weight rows and biases.
    ///
    /// JSON has no NaN or infinity, so a network holding non-finite
    /// parameters is refused with `InvalidSnapshot`; the binary encoding
    /// stores those exactly.
    pub fn to_json(&self, network: &Network) -> Result<String> {
        let snapshot = NetworkSnapshot::from_network(network)?;
        if let Some(layer) = snapshot.first_non_finite_layer() {
            return Err(Error::InvalidSnapshot(format!(
                "layer {layer} holds non-finite parameters, which JSON cannot represent"
            )));
        }
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    pub fn from_json(&self, json: &str) -> Result<Network> {
        let snapshot: NetworkSnapshot = serde_json::from_str(json)?;
        snapshot.into_network(&self.registry)
    }

    pub fn to_bytes(&self, network: &Network) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&NetworkSnapshot::from_network(network)?)?)
    }

    pub fn from_bytes(&self, bytes: &[u8]) -> Result<Network> {
        let snapshot: NetworkSnapshot = bincode::deserialize(bytes)?;
        snapshot.into_network(&self.registry)
    }

    /// Writes the binary encoding to a `.net` file.
    pub fn write_file(&self, network: &Network, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        check_extension(path)?;
        let snapshot = NetworkSnapshot::from_network(network)?;
        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &snapshot)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Network> {
        let path = path.as_ref();
        check_extension(path)?;
        let reader = BufReader::new(File::open(path)?);
        let snapshot: NetworkSnapshot = bincode::deserialize_from(reader)?;
        snapshot.into_network(&self.registry)
    }

    /// Writes the JSON projection to any path.
    pub fn export_json(&self, network: &Network, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json(network)?)?;
        Ok(())
    }
}

fn check_extension(path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext == NETWORK_FILE_EXTENSION => Ok(()),
        _ => Err(Error::InvalidExtension {
            path: path.to_path_buf(),
            expected: NETWORK_FILE_EXTENSION,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::init::Initializer;
    use crate::layers::dense::Layer;
    use crate::math::matrix::Matrix;

    #[derive(Debug)]
    struct Identity;

    impl Activation for Identity {
        fn name(&self) -> &str {
            "sigmoid"
        }
        fn value(&self, z: f64) -> f64 {
            z
        }
        fn derivative(&self, _z: f64) -> f64 {
            1.0
        }
    }

    fn network() -> Network {
        Network::builder(Layer::new(4, 3, ActivationFunction::Sigmoid, Initializer::XavierUniform).unwrap())
            .add_layer(Layer::new(3, 2, ActivationFunction::ArcTan, Initializer::XavierNormal).unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn json_projection_names_every_field() {
        let json = NetworkCodec::new().to_json(&network()).unwrap();
        for key in ["neuron_count", "input_count", "activation", "initializer", "weights", "biases"] {
            assert!(json.contains(key), "missing {key}");
        }
        assert!(json.contains("\"arctan\""));
        assert!(json.contains("\"xavier_normal\""));
    }

    #[test]
    fn encodings_reproduce_predictions_exactly() {
        let codec = NetworkCodec::new();
        let original = network();
        let input = [0.1, 0.7, -0.4, 1.0];
        let expected = original.predict(&input).unwrap();

        let from_json = codec.from_json(&codec.to_json(&original).unwrap()).unwrap();
        assert_eq!(from_json.predict(&input).unwrap(), expected);

        let from_bytes = codec.from_bytes(&codec.to_bytes(&original).unwrap()).unwrap();
        assert_eq!(from_bytes.predict(&input).unwrap(), expected);
    }

    #[test]
    fn wrong_extension_is_rejected_before_io() {
        let codec = NetworkCodec::new();
        assert!(matches!(
            codec.write_file(&network(), "/nonexistent/dir/model.json"),
            Err(Error::InvalidExtension { .. })
        ));
        assert!(matches!(codec.read_file("model"), Err(Error::InvalidExtension { .. })));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(NetworkCodec::new().from_bytes(&[1, 2, 3]).is_err());
    }

    #[test]
    fn custom_activation_with_builtin_name_is_not_encoded() {
        let forced = ActivationFunction::Custom(Arc::new(Identity));
        let mut layer = Layer::new(1, 1, forced, Initializer::Zero).unwrap();
        layer.set_weights(Matrix::from_rows(vec![vec![2.0]]).unwrap()).unwrap();
        let network = Network::builder(layer).build().unwrap();
        assert_eq!(network.predict(&[1.0]).unwrap(), vec![2.0]);

        let codec = NetworkCodec::new();
        assert!(matches!(codec.to_bytes(&network), Err(Error::InvalidSnapshot(_))));
        assert!(matches!(codec.to_json(&network), Err(Error::InvalidSnapshot(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shadow.net");
        assert!(matches!(codec.write_file(&network, &path), Err(Error::InvalidSnapshot(_))));
        assert!(!path.exists());
    }

    #[test]
    fn non_finite_parameters_need_the_binary_encoding() {
        let mut network = network();
        network
            .layer_mut(1)
            .unwrap()
            .set_biases(vec![f64::NAN, f64::INFINITY])
            .unwrap();

        let codec = NetworkCodec::new();
        assert!(matches!(codec.to_json(&network), Err(Error::InvalidSnapshot(_))));

        let restored = codec.from_bytes(&codec.to_bytes(&network).unwrap()).unwrap();
        let biases = restored.layers()[1].biases();
        assert!(biases[0].is_nan());
        assert_eq!(biases[1], f64::INFINITY);
    }
}
