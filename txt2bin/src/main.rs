use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use preprocess::source::{read_labels, read_records};
use preprocess::writer::{TEST_LABELS, TEST_VECTORS, TRAIN_LABELS, TRAIN_VECTORS};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Small tool that converts the text partitions written by `preprocess` into
/// the binary matrices read by the benchmark.
///
/// Vector files start with the row count and the row width as two `u64`,
/// followed by the rows as `f32`. Label files start with the row count as a
/// `u64`, followed by one `u8` per label. Everything is in native byte order.
///
/// Labels must therefore be integers from 0 to 255. That holds for the sift,
/// timbre and mat presets, whose labels are all `0`, and for word2vec runs
/// with at most 256 distinct words. Big5 labels concatenate five trait scores
/// and are rejected.
#[derive(Parser)]
struct Args {
    /// The directory holding train_vectors, train_labels, test_vectors and test_labels.
    dir: PathBuf,

    /// Where to write trn_vtr, trn_lbl, tst_vtr and tst_lbl, the input directory by default.
    #[arg(long)]
    output: Option<PathBuf>,
}

const CONVERSIONS: [(&str, &str, &str, &str); 2] = [
    (TRAIN_VECTORS, TRAIN_LABELS, "trn_vtr", "trn_lbl"),
    (TEST_VECTORS, TEST_LABELS, "tst_vtr", "tst_lbl"),
];

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Args { dir, output } = Args::parse();
    let output = output.unwrap_or_else(|| dir.clone());
    std::fs::create_dir_all(&output)
        .with_context(|| format!("while creating {}", output.display()))?;

    for (vectors, labels, out_vectors, out_labels) in CONVERSIONS {
        let rows = convert(
            &dir.join(vectors),
            &dir.join(labels),
            &output.join(out_vectors),
            &output.join(out_labels),
        )?;
        info!("converted {rows} rows from {vectors} into {out_vectors}");
    }

    Ok(())
}

/// Converts one vector/label pair and returns the number of rows written.
fn convert(
    vectors_path: &Path,
    labels_path: &Path,
    out_vectors: &Path,
    out_labels: &Path,
) -> anyhow::Result<usize> {
    let records = read_records(vectors_path, None)
        .with_context(|| format!("while reading {}", vectors_path.display()))?;
    let labels = read_labels(labels_path)
        .with_context(|| format!("while reading {}", labels_path.display()))?;
    if records.len() != labels.len() {
        bail!(
            "{} has {} rows but {} has {}",
            vectors_path.display(),
            records.len(),
            labels_path.display(),
            labels.len()
        );
    }

    let width = records.first().map_or(0, Vec::len);
    let mut floats = Vec::with_capacity(records.len() * width);
    for (row, record) in records.iter().enumerate() {
        for value in record {
            match value.as_f32() {
                Some(float) => floats.push(float),
                None => bail!(
                    "`{value}` at line {} of {} is not a number",
                    row + 1,
                    vectors_path.display()
                ),
            }
        }
    }

    let mut bytes = Vec::with_capacity(labels.len());
    for (row, label) in labels.iter().enumerate() {
        match label.trim().parse::<u8>() {
            Ok(byte) => bytes.push(byte),
            Err(_) => bail!(
                "label `{label}` at line {} of {} does not fit in a byte",
                row + 1,
                labels_path.display()
            ),
        }
    }

    let output = File::create(out_vectors)
        .with_context(|| format!("while opening {}", out_vectors.display()))?;
    let mut output = io::BufWriter::new(output);
    output.write_all(bytemuck::bytes_of(&(records.len() as u64)))?;
    output.write_all(bytemuck::bytes_of(&(width as u64)))?;
    output.write_all(bytemuck::cast_slice(&floats))?;
    output.flush()?;

    let output = File::create(out_labels)
        .with_context(|| format!("while opening {}", out_labels.display()))?;
    let mut output = io::BufWriter::new(output);
    output.write_all(bytemuck::bytes_of(&(labels.len() as u64)))?;
    output.write_all(&bytes)?;
    output.flush()?;

    Ok(records.len())
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    fn paths(dir: &Path) -> (PathBuf, PathBuf, PathBuf, PathBuf) {
        (dir.join("vectors"), dir.join("labels"), dir.join("vtr"), dir.join("lbl"))
    }

    #[test]
    fn writes_headers_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors, labels, vtr, lbl) = paths(dir.path());
        fs::write(&vectors, "1,2,3\n4.5,5,6\n").unwrap();
        fs::write(&labels, "7\n8\n").unwrap();

        assert_eq!(convert(&vectors, &labels, &vtr, &lbl).unwrap(), 2);

        let vtr = fs::read(vtr).unwrap();
        let (header, body) = vtr.split_at(16);
        assert_eq!(bytemuck::pod_read_unaligned::<[u64; 2]>(header), [2, 3]);
        let body: Vec<f32> = body
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect();
        assert_eq!(body, [1.0, 2.0, 3.0, 4.5, 5.0, 6.0]);

        let lbl = fs::read(lbl).unwrap();
        assert_eq!(bytemuck::pod_read_unaligned::<u64>(&lbl[..8]), 2);
        assert_eq!(&lbl[8..], &[7, 8]);
    }

    #[test]
    fn rejects_wide_labels() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors, labels, vtr, lbl) = paths(dir.path());
        fs::write(&vectors, "1\n").unwrap();
        fs::write(&labels, "300\n").unwrap();

        assert!(convert(&vectors, &labels, &vtr, &lbl).is_err());
    }

    #[test]
    fn rejects_trait_score_labels() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors, labels, vtr, lbl) = paths(dir.path());
        fs::write(&vectors, "1,2\n3,4\n").unwrap();
        fs::write(&labels, "0\n12345\n").unwrap();

        let err = convert(&vectors, &labels, &vtr, &lbl).unwrap_err();
        assert!(err.to_string().contains("`12345` at line 2"));
    }

    #[test]
    fn rejects_row_count_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors, labels, vtr, lbl) = paths(dir.path());
        fs::write(&vectors, "1\n2\n").unwrap();
        fs::write(&labels, "0\n").unwrap();

        assert!(convert(&vectors, &labels, &vtr, &lbl).is_err());
    }

    #[test]
    fn rejects_text_fields() {
        let dir = tempfile::tempdir().unwrap();
        let (vectors, labels, vtr, lbl) = paths(dir.path());
        fs::write(&vectors, "1,abc\n").unwrap();
        fs::write(&labels, "0\n").unwrap();

        assert!(convert(&vectors, &labels, &vtr, &lbl).is_err());
    }
}
