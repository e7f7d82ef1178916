//! Readers turning raw dataset files into a [`Dataset`].

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::record::{Dataset, Label, Record, Value, NO_LABEL};
use crate::PROGRESS_EVERY;

/// Anything that can produce a labeled dataset.
pub trait RecordSource {
    /// Human readable name used in logs.
    fn name(&self) -> &str;

    fn load(&self) -> Result<Dataset>;
}

fn table_reader<R: io::Read>(reader: R, has_header: bool) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(reader)
}

fn line_of(row: &csv::StringRecord, index: usize) -> usize {
    row.position().map_or(index + 1, |position| position.line() as usize)
}

/// Reads a comma separated table where every row has the same width.
///
/// The width is `width` when given, otherwise the width of the first row.
pub fn read_records_from<R: io::Read>(reader: R, width: Option<usize>) -> Result<Vec<Record>> {
    let mut reader = table_reader(reader, false);
    let mut width = width;
    let mut records = Vec::new();

    for (index, row) in reader.records().enumerate() {
        let row = row?;
        let expected = *width.get_or_insert(row.len());
        if row.len() != expected {
            return Err(Error::MalformedRecord {
                line: line_of(&row, index),
                expected,
                found: row.len(),
            });
        }
        records.push(row.iter().map(Value::parse).collect());

        if index > 0 && index % PROGRESS_EVERY == 0 {
            debug!("reading, at row {index}");
        }
    }

    Ok(records)
}

pub fn read_records(path: &Path, width: Option<usize>) -> Result<Vec<Record>> {
    read_records_from(File::open(path)?, width)
}

/// Reads one label per line, without the line terminator.
pub fn read_labels_from<R: io::Read>(reader: R) -> Result<Vec<Label>> {
    let mut labels = Vec::new();
    for line in BufReader::new(reader).lines() {
        let line = line?;
        labels.push(line.trim_end_matches('\r').to_owned());
    }
    Ok(labels)
}

pub fn read_labels(path: &Path) -> Result<Vec<Label>> {
    read_labels_from(File::open(path)?)
}

/// A comma separated vector file, with an optional parallel label file.
#[derive(Debug, Clone)]
pub struct VectorFile {
    pub name: String,
    pub vectors: PathBuf,
    pub labels: Option<PathBuf>,
}

impl VectorFile {
    pub fn new(name: impl Into<String>, vectors: impl Into<PathBuf>) -> VectorFile {
        VectorFile { name: name.into(), vectors: vectors.into(), labels: None }
    }

    pub fn with_labels(mut self, labels: impl Into<PathBuf>) -> VectorFile {
        self.labels = Some(labels.into());
        self
    }
}

impl RecordSource for VectorFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Dataset> {
        info!("reading vectors from {}", self.vectors.display());
        let records = read_records(&self.vectors, None)?;
        match &self.labels {
            Some(labels) => {
                info!("reading labels from {}", labels.display());
                Dataset::from_parts(records, read_labels(labels)?)
            }
            None => Ok(Dataset::unlabeled(records)),
        }
    }
}

/// Number of questions of the Big Five survey.
pub const BIG5_QUESTIONS: usize = 100;
/// Field holding how many questions were answered.
const BIG5_ANSWERED_FIELD: usize = 101;
/// Fields concatenated into the label.
const BIG5_LABEL_FIELDS: std::ops::Range<usize> = 104..109;

/// The Big Five personality survey export.
///
/// The first column is a row id and is ignored. Only respondents who
/// answered every question are kept; their answers form the record, with
/// blank answers read as `0`, and five trait columns form the label.
#[derive(Debug, Clone)]
pub struct Big5Survey {
    pub path: PathBuf,
}

impl Big5Survey {
    pub fn new(path: impl Into<PathBuf>) -> Big5Survey {
        Big5Survey { path: path.into() }
    }

    pub fn load_from<R: io::Read>(reader: R) -> Result<Dataset> {
        let mut reader = table_reader(reader, true);
        let mut dataset = Dataset::new();
        let mut skipped = 0;

        for (index, row) in reader.records().enumerate() {
            let row = row?;
            // +1 for the leading row id.
            if row.len() < BIG5_LABEL_FIELDS.end + 1 {
                return Err(Error::MalformedRecord {
                    line: line_of(&row, index + 1),
                    expected: BIG5_LABEL_FIELDS.end + 1,
                    found: row.len(),
                });
            }

            let fields: Vec<&str> = row.iter().skip(1).collect();
            if fields[BIG5_ANSWERED_FIELD].trim() != "100" {
                skipped += 1;
                continue;
            }

            let record = fields[..BIG5_QUESTIONS]
                .iter()
                .map(|answer| match answer.trim() {
                    "" => Value::parse("0"),
                    answer => Value::parse(answer),
                })
                .collect();
            let label: String = fields[BIG5_LABEL_FIELDS].iter().map(|f| f.trim()).collect();
            dataset.push(record, label);
        }

        info!("kept {} complete surveys, skipped {skipped} incomplete ones", dataset.len());
        Ok(dataset)
    }
}

impl RecordSource for Big5Survey {
    fn name(&self) -> &str {
        "Big Five survey"
    }

    fn load(&self) -> Result<Dataset> {
        info!("reading survey answers from {}", self.path.display());
        Big5Survey::load_from(File::open(&self.path)?)
    }
}

/// Timbre coefficients per audio segment.
pub const TIMBRE_COLUMNS: usize = 12;
/// Segments kept per track.
pub const TIMBRE_SEGMENTS: usize = 100;

/// Tracks are whole files, so progress is reported more often than rows.
const TRACKS_PROGRESS_EVERY: usize = 10_000;

/// A directory tree of per-track timbre tables, one `.csv` file per track
/// with one row of [`TIMBRE_COLUMNS`] coefficients per segment.
///
/// The first `segments` rows of a track are flattened into its record.
/// Shorter tracks are skipped.
#[derive(Debug, Clone)]
pub struct TimbreDirectory {
    pub root: PathBuf,
    pub segments: usize,
}

impl TimbreDirectory {
    pub fn new(root: impl Into<PathBuf>) -> TimbreDirectory {
        TimbreDirectory { root: root.into(), segments: TIMBRE_SEGMENTS }
    }

    fn tracks(&self) -> Result<Vec<PathBuf>> {
        let mut tracks = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            let path = entry.path();
            if entry.file_type().is_file() && path.extension().map_or(false, |ext| ext == "csv") {
                tracks.push(path.to_path_buf());
            }
        }
        Ok(tracks)
    }
}

impl RecordSource for TimbreDirectory {
    fn name(&self) -> &str {
        "song timbre"
    }

    fn load(&self) -> Result<Dataset> {
        let tracks = self.tracks()?;
        info!("extracting timbre from {} tracks under {}", tracks.len(), self.root.display());

        let mut dataset = Dataset::new();
        for (count, track) in tracks.iter().enumerate() {
            if count > 0 && count % TRACKS_PROGRESS_EVERY == 0 {
                debug!("extracting, at track {count}");
            }
            let segments = read_records(track, Some(TIMBRE_COLUMNS))?;
            if segments.len() < self.segments {
                warn!(
                    "skipping {}: {} segments, {} required",
                    track.display(),
                    segments.len(),
                    self.segments
                );
                continue;
            }
            let record = segments.into_iter().take(self.segments).flatten().collect();
            dataset.push(record, NO_LABEL);
        }

        info!(
            "extracted {} records of dimension {}",
            dataset.len(),
            self.segments * TIMBRE_COLUMNS
        );
        Ok(dataset)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rows_of_equal_width() {
        let records = read_records_from("1,2\n3,4.5\n".as_bytes(), None).unwrap();
        assert_eq!(
            records,
            vec![
                vec![Value::parse("1"), Value::parse("2")],
                vec![Value::parse("3"), Value::parse("4.5")]
            ]
        );
    }

    #[test]
    fn ragged_row_is_malformed() {
        let err = read_records_from("1,2\n3,4\n5\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 3, expected: 2, found: 1 }));
    }

    #[test]
    fn expected_width_is_enforced() {
        let err = read_records_from("1,2\n".as_bytes(), Some(3)).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { line: 1, expected: 3, found: 2 }));
    }

    #[test]
    fn labels_strip_terminators() {
        let labels = read_labels_from("cat\r\ndog\n".as_bytes()).unwrap();
        assert_eq!(labels, ["cat", "dog"]);
    }

    fn survey_row(id: usize, answers: &[&str], answered: &str, traits: &str) -> String {
        let mut fields = vec![id.to_string()];
        fields.extend((0..BIG5_QUESTIONS).map(|i| answers.get(i).unwrap_or(&"3").to_string()));
        // fields 100..104 after the id: source, answered count, and two unused columns
        fields.push("web".into());
        fields.push(answered.into());
        fields.push("x".into());
        fields.push("y".into());
        fields.extend(traits.chars().map(String::from));
        fields.join(",")
    }

    #[test]
    fn big5_filters_incomplete_surveys() {
        let header = (0..110).map(|i| format!("c{i}")).collect::<Vec<_>>().join(",");
        let input = [
            header,
            survey_row(1, &["", "5"], "100", "12345"),
            survey_row(2, &[], "99", "11111"),
            survey_row(3, &["1"], "100", "54321"),
        ]
        .join("\n");

        let dataset = Big5Survey::load_from(input.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dimensions(), Some(BIG5_QUESTIONS));
        assert_eq!(dataset.labels(), &["12345", "54321"]);
        assert_eq!(
            &dataset.records()[0][..3],
            &[Value::parse("0"), Value::parse("5"), Value::parse("3")]
        );
    }

    #[test]
    fn big5_blank_answer_matches_literal_zero() {
        let header = (0..110).map(|i| format!("c{i}")).collect::<Vec<_>>().join(",");
        let input = [
            header,
            survey_row(1, &["", "5"], "100", "12345"),
            survey_row(2, &["0", "5"], "100", "54321"),
        ]
        .join("\n");

        let dataset = Big5Survey::load_from(input.as_bytes()).unwrap();
        assert_eq!(dataset.records()[0], dataset.records()[1]);

        let dataset = dataset.dedup(crate::KeyRange::Full);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.labels(), &["12345"]);
    }

    #[test]
    fn big5_short_row_is_malformed() {
        let input = "a,b,c\n1,2,3\n";
        let err = Big5Survey::load_from(input.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord { expected: 110, found: 3, .. }));
    }
}
