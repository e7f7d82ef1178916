use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byte_unit::{Byte, UnitType};
use tracing::info;

use crate::error::Result;
use crate::record::{Label, Record};
use crate::sample::Partitions;

pub const TRAIN_VECTORS: &str = "train_vectors";
pub const TRAIN_LABELS: &str = "train_labels";
pub const TEST_VECTORS: &str = "test_vectors";
pub const TEST_LABELS: &str = "test_labels";

/// Writes every record as comma separated fields, one record per line.
pub fn write_records<W: io::Write>(records: &[Record], destination: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(destination);

    for record in records {
        writer.write_record(record.iter().map(ToString::to_string))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes one label per line, verbatim.
pub fn write_labels<W: io::Write>(labels: &[Label], destination: W) -> Result<()> {
    let mut destination = BufWriter::new(destination);
    for label in labels {
        writeln!(destination, "{label}")?;
    }
    destination.flush()?;
    Ok(())
}

/// Writes the four partition files into `dir`, creating it if needed.
pub fn write_partitions(partitions: &Partitions, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;

    let Partitions { train, test } = partitions;
    write_records(train.records(), create(dir, TRAIN_VECTORS)?)?;
    write_labels(train.labels(), create(dir, TRAIN_LABELS)?)?;
    write_records(test.records(), create(dir, TEST_VECTORS)?)?;
    write_labels(test.labels(), create(dir, TEST_LABELS)?)?;

    for name in [TRAIN_VECTORS, TRAIN_LABELS, TEST_VECTORS, TEST_LABELS] {
        let path = dir.join(name);
        let size = Byte::from_u64(fs::metadata(&path)?.len()).get_appropriate_unit(UnitType::Binary);
        info!("wrote {} ({size:#.2})", path.display());
    }
    Ok(())
}

fn create(dir: &Path, name: &str) -> Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(dir.join(name))?))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::Value;

    #[test]
    fn records_are_comma_joined() {
        let records = vec![
            vec![Value::Int(1), Value::Int(2)],
            vec![Value::Int(3), Value::Int(4)],
        ];
        let mut out = Vec::new();
        write_records(&records, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "1,2\n3,4\n");
    }

    #[test]
    fn mixed_values() {
        let records = vec![vec![Value::Float(0.5), Value::from("a"), Value::Int(-7)]];
        let mut out = Vec::new();
        write_records(&records, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0.5,a,-7\n");
    }

    #[test]
    fn labels_one_per_line() {
        let labels = vec!["12345".to_owned(), "0".to_owned()];
        let mut out = Vec::new();
        write_labels(&labels, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "12345\n0\n");
    }

    #[test]
    fn nothing_to_write() {
        let mut out = Vec::new();
        write_records(&[], &mut out).unwrap();
        write_labels(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
