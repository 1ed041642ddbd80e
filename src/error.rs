use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the engine can report.
///
/// All shape and argument checks run before any state is touched, so an
/// `Err` always leaves the network, its layers and their accumulators exactly
/// as they were before the call.
#[derive(Error, Debug)]
pub enum Error {
    /// A layer was requested with a zero input or neuron count.
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Vector or matrix shapes disagree.
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Adjacent layers cannot be chained.
    #[error(
        "topology mismatch at layer {index}: input_count {input_count} != \
         previous layer neuron_count {previous_neurons}"
    )]
    TopologyMismatch {
        index: usize,
        input_count: usize,
        previous_neurons: usize,
    },

    /// Bad hyperparameter (batch size, epoch count, learning rate, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A training label cannot index the output layer.
    #[error("label {label} of sample {index} is out of range for an output layer of {size} neurons")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        size: usize,
    },

    /// A training sample carries no label.
    #[error("sample {index} has no label")]
    MissingLabel { index: usize },

    /// No activation with this name is registered.
    #[error("unknown activation `{0}`")]
    UnknownActivation(String),

    /// A decoded snapshot is internally inconsistent.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("invalid file type for {path:?}: expected a .{expected} file")]
    InvalidExtension {
        path: PathBuf,
        expected: &'static str,
    },

    /// Malformed dataset file.
    #[error("dataset format: {0}")]
    DatasetFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary encoding error: {0}")]
    Binary(#[from] bincode::Error),
}

impl Error {
    pub(crate) fn mismatch(context: &'static str, expected: usize, actual: usize) -> Error {
        Error::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }
}
