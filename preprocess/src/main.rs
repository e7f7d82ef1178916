use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use preprocess::pipeline::{self, Options};
use preprocess::{KeyRange, Preset, DEFAULT_SEED};
use tracing_subscriber::EnvFilter;

/// Turns raw datasets into the train/test files used by the nearest-neighbor benchmark.
#[derive(Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Deduplicate, split and write a dataset.
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// The directory receiving train_vectors, train_labels, test_vectors and test_labels.
        #[arg(long, default_value = ".")]
        output: PathBuf,

        /// The seed of the train/test sampling.
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Number of training records, every record not used for testing when omitted.
        #[arg(long)]
        train: Option<usize>,

        /// Number of test records.
        #[arg(long)]
        test: Option<usize>,
    },
    /// Load and deduplicate a dataset, then report its size.
    Inspect {
        #[command(flatten)]
        input: InputArgs,
    },
    /// List the known datasets.
    Presets,
}

#[derive(clap::Args)]
struct InputArgs {
    /// The dataset to prepare.
    #[arg(value_enum)]
    preset: Preset,

    /// The raw dataset file, or directory of tracks for timbre.
    #[arg(long)]
    input: PathBuf,

    /// A file with one label per line, parallel to the input.
    #[arg(long)]
    labels: Option<PathBuf>,

    /// The fixed test vectors, for sift.
    #[arg(long)]
    test_input: Option<PathBuf>,

    /// Number of values per row of a flat matrix.
    #[arg(long)]
    dimensions: Option<usize>,

    /// Only compare the first N fields when looking for duplicates.
    #[arg(long)]
    key_fields: Option<usize>,
}

impl InputArgs {
    fn options(self, output: PathBuf) -> Options {
        let mut options = Options::new(self.input, output);
        options.labels = self.labels;
        options.test_input = self.test_input;
        options.dimensions = self.dimensions;
        options.key = self.key_fields.map_or(KeyRange::Full, KeyRange::Prefix);
        options
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Args::parse().command {
        Command::Run { input, output, seed, train, test } => {
            let preset = input.preset;
            let mut options = input.options(output);
            options.seed = seed;
            options.sizes = preset.sizes(train, test);
            if options.sizes.is_none() && (train.is_some() || test.is_some()) {
                tracing::warn!("{preset} ships its own test set, ignoring --train and --test");
            }

            let summary = pipeline::prepare(preset, &options)
                .with_context(|| format!("while preparing {preset}"))?;
            println!(
                "{preset}: {} records loaded, {} unique, {} train, {} test",
                summary.loaded, summary.unique, summary.train, summary.test
            );
        }
        Command::Inspect { input } => {
            let preset = input.preset;
            let options = input.options(PathBuf::from("."));
            let dataset = pipeline::load(preset, &options)
                .with_context(|| format!("while loading {preset}"))?;
            println!(
                "{} - {} unique records of {} dimensions",
                preset.description(),
                dataset.len(),
                dataset.dimensions().unwrap_or(0)
            );
        }
        Command::Presets => {
            for preset in enum_iterator::all::<Preset>() {
                match preset.default_sizes() {
                    Some(sizes) => {
                        let train = sizes.train.map_or("remainder".to_owned(), |n| n.to_string());
                        println!("{preset:10} {:24} train: {train}, test: {}", preset.description(), sizes.test);
                    }
                    None => println!("{preset:10} {:24} fixed test set", preset.description()),
                }
            }
        }
    }

    Ok(())
}
