use std::time::Instant;

use log::{debug, info};
use rand::seq::SliceRandom;

use crate::data::dataset::DataSet;
use crate::error::{Error, Result};
use crate::network::network::Network;
use crate::network::state::{NetworkState, TrainingProgress};
use crate::observe::NetworkEvent;
use crate::train::epoch_stats::{EpochStats, TrainReport};
use crate::train::train_config::{PartialBatch, TrainConfig};

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Trains `network` on `dataset` with mini-batch gradient descent.
///
/// Within an epoch, samples are visited in dataset order (or a fresh random
/// order when `config.shuffle` is set). After the sample at position `p`
/// (0-based) the accumulated gradient is applied whenever
/// `p % batch_size == 0`; the trailing samples of an epoch are then handled
/// according to `config.partial_batch`.
///
/// # Errors
/// - `InvalidArgument` if `batch_size < 1`, `batch_size > dataset.len()` or
///   `epochs < 1`
/// - `DimensionMismatch` if a sample's input does not fit the input layer
/// - `MissingLabel` / `LabelOutOfRange` if a sample cannot be turned into a
///   one-hot target
///
/// All samples are checked before the first one is trained on, so a failed
/// call leaves the network untouched.
pub fn train_loop(network: &mut Network, dataset: &DataSet, config: &TrainConfig) -> Result<TrainReport> {
    config.validate(dataset.len())?;
    let labels = validate_samples(network, dataset)?;

    let n = dataset.len();
    let output_count = network.output_count();
    let mut order: Vec<usize> = (0..n).collect();
    let mut report = TrainReport::default();

    network.state = NetworkState::Training;
    network.progress = TrainingProgress {
        current_epoch: 0,
        total_epochs: config.epochs,
        current_sample: 0,
        total_samples: n,
    };
    debug!(
        "training on {} samples: batch size {}, {} epochs, partial batch {:?}",
        n, config.batch_size, config.epochs, config.partial_batch
    );

    for epoch in 0..config.epochs {
        let t_start = Instant::now();
        network.progress.current_epoch = epoch;

        if config.shuffle {
            order.shuffle(&mut rand::thread_rng());
        }

        let (total_cost, updates) = match run_one_epoch(network, dataset, &labels, &order, output_count, config) {
            Ok(outcome) => outcome,
            Err(err) => {
                network.state = NetworkState::Ready;
                return Err(err);
            }
        };

        let stats = EpochStats {
            epoch: epoch + 1,
            total_epochs: config.epochs,
            mean_cost: total_cost / n as f64,
            updates,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        info!(
            "epoch {}/{}: mean cost {:.6}, {} updates",
            stats.epoch, stats.total_epochs, stats.mean_cost, stats.updates
        );
        network.notify(NetworkEvent::EpochCompleted(stats.clone()));
        report.epochs.push(stats);
    }

    network.state = NetworkState::Ready;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Checks every sample up front and returns the labels in dataset order.
fn validate_samples(network: &Network, dataset: &DataSet) -> Result<Vec<usize>> {
    let input_count = network.input_count();
    let output_count = network.output_count();

    dataset
        .iter()
        .enumerate()
        .map(|(index, sample)| {
            if sample.input().len() != input_count {
                return Err(Error::mismatch("training sample input", input_count, sample.input().len()));
            }
            let label = sample.label().ok_or(Error::MissingLabel { index })?;
            if label >= output_count {
                return Err(Error::LabelOutOfRange { index, label, size: output_count });
            }
            Ok(label)
        })
        .collect()
}

/// One pass over `order`. Returns the summed diagnostic cost and the number
/// of updates applied.
fn run_one_epoch(
    network: &mut Network,
    dataset: &DataSet,
    labels: &[usize],
    order: &[usize],
    output_count: usize,
    config: &TrainConfig,
) -> Result<(f64, usize)> {
    let n = order.len();
    let epoch = network.progress.current_epoch;
    let mut total_cost = 0.0;
    let mut updates = 0;
    let mut target = vec![0.0; output_count];

    for (p, &idx) in order.iter().enumerate() {
        network.progress.current_sample = p;
        let Some(sample) = dataset.get(idx) else { continue };

        target.fill(0.0);
        target[labels[idx]] = 1.0;

        let output = network.feed_forward_with_target(sample.input(), &target)?;
        total_cost += network.cost_function().total(&output, &target)?;

        if p % config.batch_size == 0 && network.update() {
            updates += 1;
            report_progress(network, epoch, config.epochs, p + 1, n);
        }
    }

    if network.has_pending_gradients() {
        match config.partial_batch {
            PartialBatch::Flush => {
                if network.update() {
                    updates += 1;
                    report_progress(network, epoch, config.epochs, n, n);
                }
            }
            PartialBatch::Drop => network.discard_gradients(),
            PartialBatch::Carry => {}
        }
    }

    Ok((total_cost, updates))
}

fn report_progress(network: &mut Network, epoch: usize, total_epochs: usize, sample: usize, total_samples: usize) {
    network.notify(NetworkEvent::TrainingProgress {
        epoch: epoch + 1,
        total_epochs,
        sample,
        total_samples,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::data::dataset::Match;
    use crate::init::Initializer;
    use crate::layers::dense::Layer;
    use std::sync::mpsc;

    fn single_neuron() -> Network {
        Network::builder(Layer::new(1, 2, ActivationFunction::Sigmoid, Initializer::Zero).unwrap())
            .learning_rate(0.5)
            .build()
            .unwrap()
    }

    fn samples(n: usize) -> DataSet {
        (0..n).map(|i| Match::labeled(vec![1.0], i % 2)).collect()
    }

    #[test]
    fn first_position_of_each_epoch_updates_immediately() {
        // 5 samples, batch 2: updates after positions 0, 2 and 4.
        let mut network = single_neuron();
        let report = train_loop(&mut network, &samples(5), &TrainConfig::new(2, 1)).unwrap();
        assert_eq!(report.total_updates(), 3);
        assert!(!network.has_pending_gradients());
    }

    #[test]
    fn flush_applies_trailing_partial_batch() {
        // 4 samples, batch 2: updates after 0 and 2, sample 3 is flushed.
        let mut network = single_neuron();
        let report = train_loop(&mut network, &samples(4), &TrainConfig::new(2, 1)).unwrap();
        assert_eq!(report.total_updates(), 3);
        assert!(!network.has_pending_gradients());
    }

    #[test]
    fn drop_discards_trailing_partial_batch() {
        let mut network = single_neuron();
        let config = TrainConfig::new(2, 1).with_partial_batch(PartialBatch::Drop);
        let report = train_loop(&mut network, &samples(4), &config).unwrap();
        assert_eq!(report.total_updates(), 2);
        assert!(!network.has_pending_gradients());
    }

    #[test]
    fn carry_leaves_trailing_partial_batch_pending() {
        let mut network = single_neuron();
        let config = TrainConfig::new(2, 2).with_partial_batch(PartialBatch::Carry);
        let report = train_loop(&mut network, &samples(4), &config).unwrap();
        assert_eq!(report.total_updates(), 4);
        assert_eq!(network.layers()[0].accumulated_count(), 1);
    }

    #[test]
    fn invalid_samples_leave_network_untouched() {
        let mut network = single_neuron();
        let before = network.layers()[0].weights().clone();

        let mut data = samples(3);
        data.push(Match::labeled(vec![1.0], 2));
        assert!(matches!(
            train_loop(&mut network, &data, &TrainConfig::new(1, 1)),
            Err(Error::LabelOutOfRange { index: 3, label: 2, size: 2 })
        ));

        let mut data = samples(3);
        data.push(Match::unlabeled(vec![1.0]));
        assert!(matches!(
            train_loop(&mut network, &data, &TrainConfig::new(1, 1)),
            Err(Error::MissingLabel { index: 3 })
        ));

        let mut data = samples(2);
        data.push(Match::labeled(vec![1.0, 0.0], 0));
        assert!(matches!(
            train_loop(&mut network, &data, &TrainConfig::new(1, 1)),
            Err(Error::DimensionMismatch { .. })
        ));

        assert_eq!(network.layers()[0].weights(), &before);
        assert!(!network.has_pending_gradients());
        assert_eq!(network.state(), NetworkState::Ready);
    }

    #[test]
    fn progress_events_follow_updates() {
        let (tx, rx) = mpsc::channel();
        let mut network = single_neuron();
        network.set_observer(tx);
        train_loop(&mut network, &samples(3), &TrainConfig::new(2, 1)).unwrap();
        drop(network);

        let events: Vec<NetworkEvent> = rx.iter().collect();
        assert_eq!(
            events[0],
            NetworkEvent::TrainingProgress { epoch: 1, total_epochs: 1, sample: 1, total_samples: 3 }
        );
        assert_eq!(
            events[1],
            NetworkEvent::TrainingProgress { epoch: 1, total_epochs: 1, sample: 3, total_samples: 3 }
        );
        assert!(matches!(events[2], NetworkEvent::EpochCompleted(ref s) if s.epoch == 1 && s.updates == 2));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn progress_counters_cover_the_run() {
        let mut network = single_neuron();
        train_loop(&mut network, &samples(4), &TrainConfig::new(1, 3).with_shuffle(true)).unwrap();
        let progress = network.progress();
        assert_eq!(progress.total_epochs, 3);
        assert_eq!(progress.current_epoch, 2);
        assert_eq!(progress.total_samples, 4);
        assert_eq!(progress.current_sample, 3);
    }
}
