use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::dedup::KeyRange;
use crate::error::{Error, Result};
use crate::labels::LabelMapping;
use crate::mat::MatLEView;
use crate::presets::Preset;
use crate::record::Dataset;
use crate::sample::{partition, Partitions, SplitSizes};
use crate::source::{Big5Survey, RecordSource, TimbreDirectory, VectorFile};
use crate::writer::write_partitions;
use crate::DEFAULT_SEED;

pub const LABEL_MAPPING: &str = "label_mapping.json";

/// Everything a run needs besides the preset.
#[derive(Debug, Clone)]
pub struct Options {
    /// The raw dataset: a file, or a directory for the timbre preset.
    pub input: PathBuf,
    /// One label per line, parallel to `input` (word2vec).
    pub labels: Option<PathBuf>,
    /// The fixed test vectors (sift).
    pub test_input: Option<PathBuf>,
    pub output: PathBuf,
    pub seed: u64,
    /// Overrides the preset's default sizes.
    pub sizes: Option<SplitSizes>,
    /// Row width of a flat matrix.
    pub dimensions: Option<usize>,
    pub key: KeyRange,
}

impl Options {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Options {
        Options {
            input: input.into(),
            labels: None,
            test_input: None,
            output: output.into(),
            seed: DEFAULT_SEED,
            sizes: None,
            dimensions: None,
            key: KeyRange::Full,
        }
    }
}

/// Record counts of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub loaded: usize,
    pub unique: usize,
    pub train: usize,
    pub test: usize,
}

/// Reads, deduplicates, splits and writes one dataset.
pub fn prepare(preset: Preset, options: &Options) -> Result<Summary> {
    info!("preparing {} from {}", preset.description(), options.input.display());

    if preset == Preset::Sift {
        return prepare_fixed_test(options);
    }

    let source = open_source(preset, options)?;
    let mut dataset = source.load()?;
    let loaded = dataset.len();
    info!("{} - loaded {loaded} records", source.name());

    let mapping = (preset == Preset::Word2vec).then(|| LabelMapping::intern(dataset.labels_mut()));
    if let Some(mapping) = &mapping {
        info!("interned {} distinct labels", mapping.len());
    }

    if preset.dedups() {
        dataset = dataset.dedup(options.key);
    }
    let unique = dataset.len();

    let sizes = options
        .sizes
        .or_else(|| preset.default_sizes())
        .ok_or_else(|| Error::InvalidInput(format!("{preset} has no partition sizes")))?;
    let (train_size, test_size) = sizes.resolve(unique)?;
    info!("sampling {train_size} train and {test_size} test records out of {unique} (seed {})", options.seed);

    let mut rng = StdRng::seed_from_u64(options.seed);
    let split = partition(unique, train_size, test_size, &mut rng)?;
    let partitions = dataset.split(&split);
    write_partitions(&partitions, &options.output)?;

    // Only a run that produced its partitions leaves a mapping behind.
    if let Some(mapping) = mapping {
        let file = File::create(options.output.join(LABEL_MAPPING))?;
        mapping.write_json(BufWriter::new(file))?;
    }

    Ok(Summary { loaded, unique, train: partitions.train.len(), test: partitions.test.len() })
}

/// The sift layout: only the training file is deduplicated and the test
/// file is written back untouched.
fn prepare_fixed_test(options: &Options) -> Result<Summary> {
    let test_input = options
        .test_input
        .as_ref()
        .ok_or_else(|| Error::InvalidInput("sift needs a test vector file".into()))?;

    let train = VectorFile::new("sift train", &options.input).load()?;
    let loaded = train.len();
    let train = train.dedup(options.key);
    let unique = train.len();
    let test = VectorFile::new("sift test", test_input).load()?;

    if let (Some(train_width), Some(test_width)) = (train.dimensions(), test.dimensions()) {
        if train_width != test_width {
            return Err(Error::MalformedRecord { line: 1, expected: train_width, found: test_width });
        }
    }

    let partitions = Partitions { train, test };
    write_partitions(&partitions, &options.output)?;
    Ok(Summary { loaded, unique, train: partitions.train.len(), test: partitions.test.len() })
}

fn open_source(preset: Preset, options: &Options) -> Result<Box<dyn RecordSource>> {
    let input = options.input.clone();
    Ok(match preset {
        Preset::Big5 => Box::new(Big5Survey::new(input)),
        Preset::Word2vec => {
            let labels = options
                .labels
                .clone()
                .ok_or_else(|| Error::InvalidInput("word2vec needs a label file".into()))?;
            Box::new(VectorFile::new("word2vec", input).with_labels(labels))
        }
        Preset::Timbre => Box::new(TimbreDirectory::new(input)),
        Preset::Mat => {
            let dimensions = options
                .dimensions
                .ok_or_else(|| Error::InvalidInput("a flat matrix needs its dimensions".into()))?;
            Box::new(MatLEView::<f32>::open(preset.description(), &input, dimensions)?)
        }
        Preset::Sift => Box::new(VectorFile::new("sift train", input)),
    })
}

/// Loads and deduplicates without writing anything, for inspection.
pub fn load(preset: Preset, options: &Options) -> Result<Dataset> {
    let dataset = open_source(preset, options)?.load()?;
    Ok(if preset.dedups() { dataset.dedup(options.key) } else { dataset })
}
