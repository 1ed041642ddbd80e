use std::path::Path;

use log::{debug, error, info};

use crate::error::Result;
use crate::network::network::Network;
use crate::network::state::{NetworkState, TrainingProgress};
use crate::observe::{NetworkEvent, PersistStatus};
use crate::persist::codec::NetworkCodec;

impl Network {
    /// Writes this network to a `.net` file.
    ///
    /// Failures are not returned: they are logged and reported to the
    /// observer as `NotSaved`, and the network stays usable.
    pub fn save(&mut self, path: impl AsRef<Path>, codec: &NetworkCodec) -> PersistStatus {
        let path = path.as_ref();
        self.state = NetworkState::Saving;

        let status = match codec.write_file(self, path) {
            Ok(()) => {
                info!("network saved to {}", path.display());
                self.state = NetworkState::Saved;
                PersistStatus::Saved
            }
            Err(err) => {
                error!("unable to save network to {}: {err}", path.display());
                self.state = NetworkState::Ready;
                PersistStatus::NotSaved
            }
        };

        self.notify(NetworkEvent::Persistence { status, path: path.to_path_buf() });
        status
    }

    /// Replaces this network's layers and hyperparameters with those stored
    /// in a `.net` file. The observer is kept.
    ///
    /// On failure the network is left exactly as it was and `NotRestored`
    /// is reported.
    pub fn restore(&mut self, path: impl AsRef<Path>, codec: &NetworkCodec) -> PersistStatus {
        let path = path.as_ref();
        self.state = NetworkState::Restoring;

        let status = match codec.read_file(path) {
            Ok(restored) => {
                self.adopt(restored);
                info!("network restored from {}", path.display());
                self.state = NetworkState::Restored;
                PersistStatus::Restored
            }
            Err(err) => {
                error!("unable to restore network from {}: {err}", path.display());
                self.state = NetworkState::Ready;
                PersistStatus::NotRestored
            }
        };

        self.notify(NetworkEvent::Persistence { status, path: path.to_path_buf() });
        status
    }

    /// Loads a network from a `.net` file, returning the underlying error on
    /// failure.
    pub fn restore_network(path: impl AsRef<Path>, codec: &NetworkCodec) -> Result<Network> {
        let path = path.as_ref();
        let mut network = codec.read_file(path)?;
        network.state = NetworkState::Restored;
        debug!("loaded {}-layer network from {}", network.layers.len(), path.display());
        Ok(network)
    }

    fn adopt(&mut self, other: Network) {
        self.layers = other.layers;
        self.cost_function = other.cost_function;
        self.learning_rate = other.learning_rate;
        self.derivative_input = other.derivative_input;
        self.progress = TrainingProgress::default();
    }
}
