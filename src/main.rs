//! Command-line driver: trains a network on IDX data, evaluates a saved
//! network, or prints a saved network as JSON. All logic lives in the
//! library.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use perceptra::data::idx::{self, IdxLayout};
use perceptra::{ActivationRegistry, LogObserver, Network, NetworkCodec, NetworkSpec, TrainConfig};

#[derive(Parser)]
#[command(name = "perceptra")]
#[command(about = "Feed-forward neural network trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a network from a spec, train it on IDX data and save it
    Train {
        /// IDX3 image file
        #[arg(long)]
        images: PathBuf,

        /// IDX1 label file
        #[arg(long)]
        labels: PathBuf,

        /// Network spec (JSON)
        #[arg(long)]
        spec: PathBuf,

        /// Training config (JSON); overrides --batch-size and --epochs
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value = "5")]
        batch_size: usize,

        #[arg(long, default_value = "1")]
        epochs: usize,

        /// Output file (.net)
        #[arg(long)]
        out: PathBuf,

        /// Only use the first N samples
        #[arg(long)]
        limit: Option<usize>,

        /// Decode EMNIST letters (transposed images, labels 1-26)
        #[arg(long)]
        emnist_letters: bool,
    },

    /// Report classification accuracy of a saved network
    Eval {
        /// Saved network (.net)
        #[arg(long)]
        model: PathBuf,

        #[arg(long)]
        images: PathBuf,

        #[arg(long)]
        labels: PathBuf,

        #[arg(long)]
        limit: Option<usize>,

        /// Decode EMNIST letters (transposed images, labels 1-26)
        #[arg(long)]
        emnist_letters: bool,
    },

    /// Print a saved network as JSON
    ExportJson {
        /// Saved network (.net)
        #[arg(long)]
        model: PathBuf,

        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn layout(emnist_letters: bool) -> IdxLayout {
    if emnist_letters {
        IdxLayout::EmnistLetters
    } else {
        IdxLayout::Standard
    }
}

fn run(cli: Cli) -> perceptra::Result<ExitCode> {
    let codec = NetworkCodec::new();

    match cli.command {
        Commands::Train { images, labels, spec, config, batch_size, epochs, out, limit, emnist_letters } => {
            let spec = NetworkSpec::load_json(&spec)?;
            let config = match config {
                Some(path) => TrainConfig::load_json(path)?,
                None => TrainConfig::new(batch_size, epochs),
            };
            let dataset = idx::load_pair_with(&images, &labels, limit, layout(emnist_letters))?;

            let mut network = spec.build(&ActivationRegistry::new())?;
            network.set_observer(LogObserver::new());

            let report = network.train_with(&dataset, &config)?;
            if let Some(cost) = report.final_cost() {
                info!("final mean cost {cost:.6} after {} updates", report.total_updates());
            }

            if !network.save(&out, &codec).is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }

        Commands::Eval { model, images, labels, limit, emnist_letters } => {
            let network = Network::restore_network(&model, &codec)?;
            let dataset = idx::load_pair_with(&images, &labels, limit, layout(emnist_letters))?;
            let evaluation = network.evaluate(&dataset)?;
            println!(
                "{}/{} correct ({:.2}%)",
                evaluation.correct,
                evaluation.total,
                evaluation.accuracy * 100.0
            );
        }

        Commands::ExportJson { model, out } => {
            let network = Network::restore_network(&model, &codec)?;
            match out {
                Some(path) => codec.export_json(&network, path)?,
                None => println!("{}", codec.to_json(&network)?),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
