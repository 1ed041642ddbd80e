use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};

/// What happens to gradients accumulated after an epoch's last update
/// position when the epoch length is not a multiple of the batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartialBatch {
    /// Apply the partial batch as its own averaged update.
    #[default]
    Flush,
    /// Throw the partial batch away.
    Drop,
    /// Keep it accumulated; it is merged into the next epoch's first update
    /// and stays pending after the final epoch.
    Carry,
}

/// Hyperparameters for a training run.
///
/// # Fields
/// - `batch_size`: samples per update; use `1` for online SGD
/// - `epochs`: full passes over the training data
/// - `partial_batch`: policy for an epoch's trailing partial batch
/// - `shuffle`: shuffle the sample order before every epoch
///
/// Loadable from JSON:
///
/// ```json
/// { "batch_size": 5, "epochs": 1, "partial_batch": "flush", "shuffle": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub batch_size: usize,
    pub epochs: usize,
    #[serde(default)]
    pub partial_batch: PartialBatch,
    #[serde(default)]
    pub shuffle: bool,
}

impl TrainConfig {
    /// Creates a config that flushes partial batches and keeps sample order.
    pub fn new(batch_size: usize, epochs: usize) -> Self {
        TrainConfig {
            batch_size,
            epochs,
            partial_batch: PartialBatch::Flush,
            shuffle: false,
        }
    }

    pub fn with_partial_batch(mut self, policy: PartialBatch) -> Self {
        self.partial_batch = policy;
        self
    }

    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Checks the config against a dataset of `samples` items.
    pub fn validate(&self, samples: usize) -> Result<()> {
        if self.batch_size < 1 {
            return Err(Error::InvalidArgument(
                "batch size must be more than or equal to one".to_owned(),
            ));
        }
        if self.batch_size > samples {
            return Err(Error::InvalidArgument(format!(
                "batch size {} exceeds the {} samples in the training dataset",
                self.batch_size, samples
            )));
        }
        if self.epochs < 1 {
            return Err(Error::InvalidArgument(
                "the number of epochs must be more than or equal to one".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainConfig> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_bad_arguments() {
        assert!(TrainConfig::new(0, 1).validate(10).is_err());
        assert!(TrainConfig::new(11, 1).validate(10).is_err());
        assert!(TrainConfig::new(2, 0).validate(10).is_err());
        assert!(TrainConfig::new(10, 1).validate(10).is_ok());
    }

    #[test]
    fn optional_fields_default() {
        let config: TrainConfig = serde_json::from_str(r#"{ "batch_size": 4, "epochs": 3 }"#).unwrap();
        assert_eq!(config, TrainConfig::new(4, 3));

        let config: TrainConfig =
            serde_json::from_str(r#"{ "batch_size": 4, "epochs": 3, "partial_batch": "carry", "shuffle": true }"#)
                .unwrap();
        assert_eq!(config.partial_batch, PartialBatch::Carry);
        assert!(config.shuffle);
    }

    #[test]
    fn json_file_round_trip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = TrainConfig::new(5, 2).with_partial_batch(PartialBatch::Drop);
        config.save_json(file.path()).unwrap();
        assert_eq!(TrainConfig::load_json(file.path()).unwrap(), config);
    }
}
