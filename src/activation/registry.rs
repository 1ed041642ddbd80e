use std::collections::HashMap;
use std::sync::Arc;

use crate::activation::activation::{Activation, ActivationFunction};
use crate::error::{Error, Result};

/// Name → activation lookup used when rebuilding networks from text.
///
/// Built-in activations always resolve. Custom ones resolve only after
/// [`register`](ActivationRegistry::register); the registry is a plain value
/// owned by whoever decodes networks, never shared process state.
#[derive(Debug, Clone, Default)]
pub struct ActivationRegistry {
    custom: HashMap<String, Arc<dyn Activation>>,
}

impl ActivationRegistry {
    pub fn new() -> ActivationRegistry {
        ActivationRegistry::default()
    }

    /// Adds (or replaces) a custom activation under its own name.
    ///
    /// Built-in names cannot be shadowed.
    pub fn register(&mut self, activation: Arc<dyn Activation>) -> Result<()> {
        let name = activation.name().to_owned();
        if ActivationFunction::builtin(&name).is_some() {
            return Err(Error::InvalidArgument(format!(
                "`{name}` is a built-in activation and cannot be re-registered"
            )));
        }
        self.custom.insert(name, activation);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<ActivationFunction> {
        if let Some(builtin) = ActivationFunction::builtin(name) {
            return Ok(builtin);
        }
        self.custom
            .get(name)
            .map(|a| ActivationFunction::Custom(Arc::clone(a)))
            .ok_or_else(|| Error::UnknownActivation(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        ActivationFunction::builtin(name).is_some() || self.custom.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Identity;

    impl Activation for Identity {
        fn name(&self) -> &str {
            "identity"
        }
        fn value(&self, z: f64) -> f64 {
            z
        }
        fn derivative(&self, _z: f64) -> f64 {
            1.0
        }
    }

    #[test]
    fn builtins_always_resolve() {
        let registry = ActivationRegistry::new();
        assert_eq!(registry.resolve("tanh").unwrap(), ActivationFunction::TanH);
        assert!(matches!(
            registry.resolve("identity"),
            Err(Error::UnknownActivation(name)) if name == "identity"
        ));
    }

    #[test]
    fn registered_custom_activation_resolves() {
        let mut registry = ActivationRegistry::new();
        registry.register(Arc::new(Identity)).unwrap();
        let f = registry.resolve("identity").unwrap();
        assert_eq!(f.value(-3.5), -3.5);
        assert!(registry.contains("identity"));
    }

    #[test]
    fn builtin_names_are_reserved() {
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

        let mut registry = ActivationRegistry::new();
        assert!(registry.register(Arc::new(FakeSigmoid)).is_err());
    }
}
