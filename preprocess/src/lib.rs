//! Preparation of nearest-neighbor benchmark datasets: read a raw dataset,
//! drop repeated records, draw a seeded train/test split and write both
//! partitions as comma separated text.

mod dedup;
pub mod error;
mod labels;
mod mat;
pub mod pipeline;
mod presets;
mod record;
mod sample;
pub mod source;
pub mod writer;

pub use dedup::{dedup, dedup_by_key, first_occurrences, KeyRange};
pub use error::{Error, Result};
pub use labels::{LabelEntry, LabelMapping};
pub use mat::MatLEView;
pub use presets::Preset;
pub use record::{Dataset, Label, Record, Value, NO_LABEL};
pub use sample::{partition, partition_seeded, Partitions, Split, SplitSizes};

/// The seed every split is drawn with unless told otherwise.
pub const DEFAULT_SEED: u64 = 1;

/// How often long loops report their progress.
pub const PROGRESS_EVERY: usize = 100_000;
