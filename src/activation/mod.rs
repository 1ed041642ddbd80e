pub mod activation;
pub mod registry;

pub use activation::{Activation, ActivationFunction, LEAKY_RELU_SLOPE};
pub use registry::ActivationRegistry;
