pub mod builder;
pub mod network;
pub mod spec;
pub mod state;

pub use builder::NetworkBuilder;
pub use network::{Evaluation, Network};
pub use spec::{LayerSpec, NetworkSpec};
pub use state::{DerivativeInput, NetworkState, TrainingProgress};
