use serde::{Serialize, Deserialize};

/// Per-epoch training statistics.
///
/// One value is produced at the end of every completed epoch; it is both
/// returned in the [`TrainReport`] and sent to the network's observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Mean diagnostic cost over all samples of this epoch, measured on the
    /// forward pass that preceded each sample's backward pass.
    pub mean_cost: f64,
    /// Parameter updates applied during this epoch.
    pub updates: usize,
    /// Wall-clock duration of this single epoch in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome of a training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainReport {
    pub epochs: Vec<EpochStats>,
}

impl TrainReport {
    /// Mean cost of the last completed epoch.
    pub fn final_cost(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.mean_cost)
    }

    pub fn total_updates(&self) -> usize {
        self.epochs.iter().map(|e| e.updates).sum()
    }
}
