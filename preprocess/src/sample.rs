use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::error::{Error, Result};
use crate::record::Dataset;

/// How many records go to each partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSizes {
    /// `None` means every record that is not drawn for the test set.
    pub train: Option<usize>,
    pub test: usize,
}

impl SplitSizes {
    pub fn new(train: usize, test: usize) -> SplitSizes {
        SplitSizes { train: Some(train), test }
    }

    /// Everything that is not in the test set is used for training.
    pub fn remainder(test: usize) -> SplitSizes {
        SplitSizes { train: None, test }
    }

    /// Resolves the sizes against a dataset of `available` records.
    pub fn resolve(&self, available: usize) -> Result<(usize, usize)> {
        let train = match self.train {
            Some(train) => train,
            None => available
                .checked_sub(self.test)
                .ok_or(Error::InvalidSize { requested: self.test, available })?,
        };
        Ok((train, self.test))
    }
}

/// Two disjoint sets of indices into a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub train: BTreeSet<usize>,
    pub test: BTreeSet<usize>,
}

/// Draws `train_size + test_size` distinct indices out of `0..n`, uniformly
/// and without replacement. The first `test_size` drawn form the test set.
pub fn partition<R: Rng + ?Sized>(
    n: usize,
    train_size: usize,
    test_size: usize,
    rng: &mut R,
) -> Result<Split> {
    let requested = train_size.saturating_add(test_size);
    if requested > n {
        return Err(Error::InvalidSize { requested, available: n });
    }

    let mut drawn = index::sample(rng, n, requested).into_iter();
    let test = drawn.by_ref().take(test_size).collect();
    let train = drawn.collect();
    Ok(Split { train, test })
}

/// Same as [`partition`] with a generator freshly seeded from `seed`.
pub fn partition_seeded(n: usize, train_size: usize, test_size: usize, seed: u64) -> Result<Split> {
    let mut rng = StdRng::seed_from_u64(seed);
    partition(n, train_size, test_size, &mut rng)
}

/// The training and test halves of a split dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partitions {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    /// Moves the records selected by `split` into their partition, keeping
    /// the dataset order. Records in neither set are dropped.
    pub fn split(self, split: &Split) -> Partitions {
        let mut partitions = Partitions::default();
        for (index, (record, label)) in self.records.into_iter().zip(self.labels).enumerate() {
            if split.test.contains(&index) {
                partitions.test.push(record, label);
            } else if split.train.contains(&index) {
                partitions.train.push(record, label);
            }
        }

        info!(
            "split into {} train and {} test records",
            partitions.train.len(),
            partitions.test.len()
        );
        partitions
    }
}
