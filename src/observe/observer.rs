use std::path::PathBuf;
use std::sync::mpsc;

use log::{info, warn};

use crate::train::epoch_stats::EpochStats;

const PROGRESS_BAR_LENGTH: usize = 25;
const PROGRESS_BAR_FILL: char = '/';
const PROGRESS_BAR_EMPTY: char = '.';

/// Terminal outcome of a save or restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistStatus {
    Saved,
    NotSaved,
    Restored,
    NotRestored,
}

impl PersistStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, PersistStatus::Saved | PersistStatus::Restored)
    }
}

/// Something a network reports after a state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkEvent {
    /// Sent after each applied batch update. `epoch` and `sample` are 1-based.
    TrainingProgress {
        epoch: usize,
        total_epochs: usize,
        sample: usize,
        total_samples: usize,
    },
    EpochCompleted(EpochStats),
    Persistence {
        status: PersistStatus,
        path: PathBuf,
    },
}

/// Passive listener notified by a [`Network`](crate::Network).
///
/// Observers cannot influence the network; a training run always finishes
/// its configured epochs.
pub trait NetworkObserver: Send {
    fn notify(&mut self, event: &NetworkEvent);
}

/// Forwards every event over a channel. A dropped receiver is ignored.
impl NetworkObserver for mpsc::Sender<NetworkEvent> {
    fn notify(&mut self, event: &NetworkEvent) {
        let _ = self.send(event.clone());
    }
}

/// Reports events through the `log` facade, rendering training progress as
/// a text bar such as `120/600  /////....................`.
#[derive(Debug, Default)]
pub struct LogObserver;

impl LogObserver {
    pub fn new() -> LogObserver {
        LogObserver
    }
}

impl NetworkObserver for LogObserver {
    fn notify(&mut self, event: &NetworkEvent) {
        match event {
            NetworkEvent::TrainingProgress { epoch, total_epochs, sample, total_samples } => {
                info!(
                    "Training...\tEpoch {}/{}\tProgress {}",
                    epoch,
                    total_epochs,
                    progress_bar(*sample, *total_samples)
                );
            }
            NetworkEvent::EpochCompleted(stats) => {
                info!(
                    "Epoch {}/{} done: mean cost = {:.6}, {} updates in {} ms",
                    stats.epoch, stats.total_epochs, stats.mean_cost, stats.updates, stats.elapsed_ms
                );
            }
            NetworkEvent::Persistence { status, path } => match status {
                PersistStatus::Saved => info!("Saved successfully in <{}>", path.display()),
                PersistStatus::Restored => info!("Restored successfully from <{}>", path.display()),
                PersistStatus::NotSaved => warn!("Unable to save in <{}>", path.display()),
                PersistStatus::NotRestored => warn!("Unable to restore from <{}>", path.display()),
            },
        }
    }
}

/// Renders `current/max` followed by a fixed-width bar.
pub fn progress_bar(current: usize, max: usize) -> String {
    let filled = if max == 0 {
        PROGRESS_BAR_LENGTH
    } else {
        (PROGRESS_BAR_LENGTH * current.min(max)).div_ceil(max)
    };

    let mut bar = format!("{current}/{max}\t");
    bar.extend((0..PROGRESS_BAR_LENGTH).map(|i| {
        if i < filled { PROGRESS_BAR_FILL } else { PROGRESS_BAR_EMPTY }
    }));
    bar
}
