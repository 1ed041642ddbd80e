// Integration tests for saving, restoring and exporting networks.

use std::sync::Arc;

use perceptra::{
    Activation, ActivationFunction, DataSet, Error, Initializer, Layer, Match, Network, NetworkCodec,
    NetworkSnapshot, PersistStatus,
};

#[derive(Debug)]
struct Softsign;

impl Activation for Softsign {
    fn name(&self) -> &str {
        "softsign"
    }

    fn value(&self, z: f64) -> f64 {
        z / (1.0 + z.abs())
    }

    fn derivative(&self, z: f64) -> f64 {
        1.0 / (1.0 + z.abs()).powi(2)
    }
}

fn trained_network() -> Network {
    let mut network = Network::builder(Layer::new(4, 5, ActivationFunction::ReLU, Initializer::Kaiming).unwrap())
        .add_layer(Layer::new(5, 3, ActivationFunction::Sigmoid, Initializer::XavierUniform).unwrap())
        .learning_rate(0.1)
        .build()
        .unwrap();
    let data: DataSet = (0..6)
        .map(|i| Match::labeled(vec![i as f64 / 6.0, 0.3, -0.2, 1.0], i % 3))
        .collect();
    network.train(&data, 2, 3).unwrap();
    network
}

#[test]
fn binary_file_round_trip_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trained.net");
    let codec = NetworkCodec::new();

    let mut original = trained_network();
    assert_eq!(original.save(&path, &codec), PersistStatus::Saved);

    let restored = Network::restore_network(&path, &codec).unwrap();
    for input in [[0.0, 0.0, 0.0, 0.0], [0.25, -1.5, 3.0, 0.125]] {
        let a = original.predict(&input).unwrap();
        let b = restored.predict(&input).unwrap();
        assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
    }
    assert_eq!(restored.learning_rate(), 0.1);
    assert!(restored.layers().iter().all(|l| l.accumulated_count() == 0));
}

#[test]
fn json_projection_round_trip_is_bit_exact() {
    let codec = NetworkCodec::new();
    let original = trained_network();
    let json = codec.to_json(&original).unwrap();

    let snapshot: NetworkSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(snapshot, NetworkSnapshot::from_network(&original).unwrap());

    let restored = codec.from_json(&json).unwrap();
    let input = [0.9, 0.1, -0.4, 0.6];
    assert_eq!(original.predict(&input).unwrap(), restored.predict(&input).unwrap());
}

#[test]
fn restore_into_existing_network_replaces_its_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.net");
    let codec = NetworkCodec::new();

    let mut source = trained_network();
    source.save(&path, &codec);

    let mut target = Network::builder(Layer::new(2, 2, ActivationFunction::TanH, Initializer::Zero).unwrap())
        .build()
        .unwrap();
    assert_eq!(target.restore(&path, &codec), PersistStatus::Restored);
    assert_eq!(target.input_count(), 4);
    assert_eq!(target.output_count(), 3);
    assert_eq!(target.predict(&[1.0, 2.0, 3.0, 4.0]).unwrap(), source.predict(&[1.0, 2.0, 3.0, 4.0]).unwrap());
}

#[test]
fn non_net_extension_is_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let codec = NetworkCodec::new();
    let mut network = trained_network();

    assert_eq!(network.save(dir.path().join("model.bin"), &codec), PersistStatus::NotSaved);
    assert!(!dir.path().join("model.bin").exists());
    assert!(matches!(
        Network::restore_network(dir.path().join("model.bin"), &codec),
        Err(Error::InvalidExtension { .. })
    ));
}

#[test]
fn custom_activation_needs_registration_to_restore() {
    let mut network = Network::builder(
        Layer::new(2, 2, ActivationFunction::custom(Softsign).unwrap(), Initializer::XavierUniform).unwrap(),
    )
    .build()
    .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("softsign.net");

    let mut codec = NetworkCodec::new();
    assert_eq!(network.save(&path, &codec), PersistStatus::Saved);
    assert!(matches!(
        Network::restore_network(&path, &codec),
        Err(Error::UnknownActivation(name)) if name == "softsign"
    ));

    codec.register_activation(Arc::new(Softsign)).unwrap();
    let restored = Network::restore_network(&path, &codec).unwrap();
    assert_eq!(restored.layers()[0].activation().name(), "softsign");
    assert_eq!(restored.predict(&[0.5, -0.5]).unwrap(), network.predict(&[0.5, -0.5]).unwrap());
}

#[test]
fn builtin_names_cannot_be_shadowed() {
    #[derive(Debug)]
    struct FakeSigmoid;
    impl Activation for FakeSigmoid {
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

    let mut codec = NetworkCodec::new();
    assert!(matches!(codec.register_activation(Arc::new(FakeSigmoid)), Err(Error::InvalidArgument(_))));
    assert!(matches!(ActivationFunction::custom(FakeSigmoid), Err(Error::InvalidArgument(_))));

    // a directly built variant still cannot be saved under the built-in name
    let mut layer = Layer::new(1, 1, ActivationFunction::Custom(Arc::new(FakeSigmoid)), Initializer::Zero).unwrap();
    layer.set_weights(perceptra::Matrix::from_rows(vec![vec![2.0]]).unwrap()).unwrap();
    let mut network = Network::builder(layer).build().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shadow.net");
    assert_eq!(network.save(&path, &codec), PersistStatus::NotSaved);
    assert!(matches!(codec.to_bytes(&network), Err(Error::InvalidSnapshot(_))));
    assert_eq!(network.predict(&[1.0]).unwrap(), vec![2.0]);
}
