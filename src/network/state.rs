/// Lifecycle phase of a network. Purely informational: no operation is
/// refused because of the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NetworkState {
    #[default]
    Ready,
    Training,
    Saving,
    Saved,
    Restoring,
    Restored,
}

/// Where the current (or last) training run is. Epoch and sample indices
/// are 0-based positions; totals are counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingProgress {
    pub current_epoch: usize,
    pub total_epochs: usize,
    pub current_sample: usize,
    pub total_samples: usize,
}

/// Which value the activation derivative is evaluated at during
/// backpropagation.
///
/// `Output` passes the layer's post-activation value `a` to the derivative,
/// so a Sigmoid layer scales its error by `σ(a) · (1 - σ(a))`. This matches
/// every network trained before the option existed. `PreActivation` passes
/// the linear sum `z` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivativeInput {
    #[default]
    Output,
    PreActivation,
}
