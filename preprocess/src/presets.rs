use std::fmt;

use clap::ValueEnum;
use enum_iterator::Sequence;

use crate::sample::SplitSizes;

/// The datasets prepared for the benchmark.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Sequence)]
pub enum Preset {
    /// Big Five personality survey answers (100)
    Big5,
    /// GoogleNews word2vec embeddings with their words as labels (300)
    Word2vec,
    /// SIFT descriptors, with a separate fixed test file (128)
    Sift,
    /// Million Song Dataset timbre features (1200)
    Timbre,
    /// Any flat little-endian f32 matrix
    Mat,
}

impl Preset {
    /// Default partition sizes, `None` when the dataset ships its own test set.
    pub fn default_sizes(self) -> Option<SplitSizes> {
        match self {
            Preset::Big5 => Some(SplitSizes::new(990_000, 10_000)),
            Preset::Word2vec => Some(SplitSizes::new(2_990_000, 10_000)),
            Preset::Sift => None,
            Preset::Timbre | Preset::Mat => Some(SplitSizes::remainder(10_000)),
        }
    }

    /// The default sizes with the given overrides applied.
    pub fn sizes(self, train: Option<usize>, test: Option<usize>) -> Option<SplitSizes> {
        self.default_sizes().map(|defaults| SplitSizes {
            train: train.or(defaults.train),
            test: test.unwrap_or(defaults.test),
        })
    }

    /// Whether repeated records are dropped before sampling.
    pub fn dedups(self) -> bool {
        !matches!(self, Preset::Timbre)
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Big5 => "Big Five survey",
            Preset::Word2vec => "GoogleNews word2vec",
            Preset::Sift => "SIFT descriptors",
            Preset::Timbre => "song timbre",
            Preset::Mat => "flat f32 matrix",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Preset::Big5 => f.pad("big5"),
            Preset::Word2vec => f.pad("word2vec"),
            Preset::Sift => f.pad("sift"),
            Preset::Timbre => f.pad("timbre"),
            Preset::Mat => f.pad("mat"),
        }
    }
}
