use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Slope used by `LeakyReLU` for non-positive inputs.
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// A scalar activation: a value function and its derivative.
///
/// Implement this to plug a new activation into layers without touching any
/// caller; wrap it in [`ActivationFunction::Custom`] and register it in an
/// [`ActivationRegistry`](crate::activation::ActivationRegistry) so saved
/// networks that use it can be restored.
pub trait Activation: Send + Sync + fmt::Debug {
    /// Stable identifier written into snapshots.
    fn name(&self) -> &str;

    fn value(&self, z: f64) -> f64;

    fn derivative(&self, z: f64) -> f64;

    fn values(&self, z: &[f64]) -> Vec<f64> {
        z.iter().map(|&x| self.value(x)).collect()
    }

    fn derivatives(&self, z: &[f64]) -> Vec<f64> {
        z.iter().map(|&x| self.derivative(x)).collect()
    }
}

/// The activations a layer can apply element-wise.
#[derive(Clone)]
pub enum ActivationFunction {
    Sigmoid,
    TanH,
    ReLU,
    /// ReLU with a fixed slope of [`LEAKY_RELU_SLOPE`] below zero.
    LeakyReLU,
    ArcTan,
    Custom(Arc<dyn Activation>),
}

impl ActivationFunction {
    /// Names of the built-in variants, in declaration order.
    pub const BUILTIN_NAMES: [&'static str; 5] = ["sigmoid", "tanh", "relu", "leaky_relu", "arctan"];

    /// Resolves a built-in variant by its snapshot name.
    pub fn builtin(name: &str) -> Option<ActivationFunction> {
        match name {
            "sigmoid" => Some(ActivationFunction::Sigmoid),
            "tanh" => Some(ActivationFunction::TanH),
            "relu" => Some(ActivationFunction::ReLU),
            "leaky_relu" => Some(ActivationFunction::LeakyReLU),
            "arctan" => Some(ActivationFunction::ArcTan),
            _ => None,
        }
    }

    /// Wraps a user activation. Built-in names are reserved: a snapshot
    /// stores only the name, so a custom `"sigmoid"` would come back as the
    /// built-in one.
    pub fn custom<A: Activation + 'static>(activation: A) -> Result<ActivationFunction> {
        let activation: Arc<dyn Activation> = Arc::new(activation);
        if ActivationFunction::builtin(activation.name()).is_some() {
            return Err(Error::InvalidArgument(format!(
                "`{}` is a built-in activation name and cannot be used by a custom activation",
                activation.name()
            )));
        }
        Ok(ActivationFunction::Custom(activation))
    }

    /// True for a `Custom` variant whose name belongs to a built-in. Such a
    /// value can only be made by constructing the variant directly.
    pub fn shadows_builtin(&self) -> bool {
        matches!(self, ActivationFunction::Custom(inner) if ActivationFunction::builtin(inner.name()).is_some())
    }
}

impl Activation for ActivationFunction {
    fn name(&self) -> &str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::TanH => "tanh",
            ActivationFunction::ReLU => "relu",
            ActivationFunction::LeakyReLU => "leaky_relu",
            ActivationFunction::ArcTan => "arctan",
            ActivationFunction::Custom(inner) => inner.name(),
        }
    }

    fn value(&self, z: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + (-z).exp()),
            // Same value as (e^z - e^-z) / (e^z + e^-z) without overflowing for large |z|.
            ActivationFunction::TanH => z.tanh(),
            ActivationFunction::ReLU => if z <= 0.0 { 0.0 } else { z },
            ActivationFunction::LeakyReLU => if z <= 0.0 { LEAKY_RELU_SLOPE * z } else { z },
            ActivationFunction::ArcTan => z.atan(),
            ActivationFunction::Custom(inner) => inner.value(z),
        }
    }

    fn derivative(&self, z: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let s = self.value(z);
                s * (1.0 - s)
            }
            ActivationFunction::TanH => {
                let t = self.value(z);
                1.0 - t * t
            }
            ActivationFunction::ReLU => if z <= 0.0 { 0.0 } else { 1.0 },
            ActivationFunction::LeakyReLU => if z <= 0.0 { LEAKY_RELU_SLOPE } else { 1.0 },
            ActivationFunction::ArcTan => 1.0 / (z * z + 1.0),
            ActivationFunction::Custom(inner) => inner.derivative(z),
        }
    }
}

impl fmt::Debug for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFunction::Sigmoid => f.write_str("Sigmoid"),
            ActivationFunction::TanH => f.write_str("TanH"),
            ActivationFunction::ReLU => f.write_str("ReLU"),
            ActivationFunction::LeakyReLU => f.write_str("LeakyReLU"),
            ActivationFunction::ArcTan => f.write_str("ArcTan"),
            ActivationFunction::Custom(inner) => f.debug_tuple("Custom").field(inner).finish(),
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two activations are equal when they share a name.
impl PartialEq for ActivationFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

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

    #[test]
    fn sigmoid_is_half_at_zero() {
        let s = ActivationFunction::Sigmoid;
        assert_eq!(s.value(0.0), 0.5);
        assert_eq!(s.derivative(0.0), 0.25);
    }

    #[test]
    fn tanh_matches_exponential_definition() {
        let t = ActivationFunction::TanH;
        for &z in &[-2.0, -0.3, 0.0, 0.7, 3.0] {
            let expected = (f64::exp(z) - f64::exp(-z)) / (f64::exp(z) + f64::exp(-z));
            assert_abs_diff_eq!(t.value(z), expected, epsilon = 1e-12);
            assert_abs_diff_eq!(t.derivative(z), 1.0 - expected * expected, epsilon = 1e-12);
        }
        assert_eq!(t.value(1000.0), 1.0);
    }

    #[test]
    fn relu_family_thresholds_at_zero() {
        let r = ActivationFunction::ReLU;
        assert_eq!(r.value(-3.0), 0.0);
        assert_eq!(r.value(2.5), 2.5);
        assert_eq!(r.derivative(0.0), 0.0);
        assert_eq!(r.derivative(1e-9), 1.0);

        let l = ActivationFunction::LeakyReLU;
        assert_abs_diff_eq!(l.value(-2.0), -0.02, epsilon = 1e-15);
        assert_eq!(l.derivative(0.0), LEAKY_RELU_SLOPE);
        assert_eq!(l.derivative(4.0), 1.0);
    }

    #[test]
    fn arctan_derivative() {
        let a = ActivationFunction::ArcTan;
        assert_abs_diff_eq!(a.value(1.0), std::f64::consts::FRAC_PI_4, epsilon = 1e-15);
        assert_eq!(a.derivative(1.0), 0.5);
    }

    #[test]
    fn vectorized_helpers_apply_elementwise() {
        let r = ActivationFunction::ReLU;
        assert_eq!(r.values(&[-1.0, 0.0, 2.0]), vec![0.0, 0.0, 2.0]);
        assert_eq!(r.derivatives(&[-1.0, 0.0, 2.0]), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn custom_activation_dispatches_through_enum() {
        let c = ActivationFunction::custom(Softsign).unwrap();
        assert_eq!(c.name(), "softsign");
        assert!(!c.shadows_builtin());
        assert_eq!(c.value(1.0), 0.5);
        assert_eq!(c.derivative(1.0), 0.25);
        assert_ne!(c, ActivationFunction::Sigmoid);
    }

    #[derive(Debug)]
    struct Identity(&'static str);

    impl Activation for Identity {
        fn name(&self) -> &str {
            self.0
        }
        fn value(&self, z: f64) -> f64 {
            z
        }
        fn derivative(&self, _z: f64) -> f64 {
            1.0
        }
    }

    #[test]
    fn custom_cannot_take_a_builtin_name() {
        for name in ActivationFunction::BUILTIN_NAMES {
            assert!(matches!(ActivationFunction::custom(Identity(name)), Err(Error::InvalidArgument(_))));
        }
        assert!(ActivationFunction::custom(Identity("identity")).is_ok());

        let forced = ActivationFunction::Custom(Arc::new(Identity("sigmoid")));
        assert!(forced.shadows_builtin());
        assert!(!ActivationFunction::Sigmoid.shadows_builtin());
    }

    #[test]
    fn builtin_names_round_trip() {
        for name in ActivationFunction::BUILTIN_NAMES {
            let f = ActivationFunction::builtin(name).unwrap();
            assert_eq!(f.name(), name);
        }
        assert!(ActivationFunction::builtin("softmax").is_none());
    }
}
