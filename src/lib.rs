pub mod error;
pub mod math;
pub mod activation;
pub mod loss;
pub mod init;
pub mod layers;
pub mod network;
pub mod train;
pub mod observe;
pub mod data;
pub mod persist;

// Convenience re-exports
pub use error::{Error, Result};
pub use math::matrix::Matrix;
pub use activation::{Activation, ActivationFunction, ActivationRegistry};
pub use loss::cost_function::CostFunction;
pub use init::Initializer;
pub use layers::dense::Layer;
pub use network::{
    DerivativeInput, Evaluation, LayerSpec, Network, NetworkBuilder, NetworkSpec, NetworkState, TrainingProgress,
};
pub use train::{EpochStats, PartialBatch, TrainConfig, TrainReport};
pub use observe::{LogObserver, NetworkEvent, NetworkObserver, PersistStatus};
pub use data::{DataSet, Match};
pub use persist::{NetworkCodec, NetworkSnapshot};
