use std::collections::HashSet;
use std::hash::Hash;

use tracing::{debug, info};

use crate::record::Dataset;
use crate::PROGRESS_EVERY;

/// The part of a record two records are compared on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum KeyRange {
    /// Every field.
    #[default]
    Full,
    /// The first `n` fields.
    Prefix(usize),
    /// Fields `start..end`.
    Fields { start: usize, end: usize },
}

impl KeyRange {
    /// Returns the slice of `record` used as the key, clamped to its width.
    pub fn key<'a, T>(&self, record: &'a [T]) -> &'a [T] {
        let width = record.len();
        match *self {
            KeyRange::Full => record,
            KeyRange::Prefix(n) => &record[..n.min(width)],
            KeyRange::Fields { start, end } => {
                let end = end.min(width);
                &record[start.min(end)..end]
            }
        }
    }
}

/// Removes exact repeats, keeping the first occurrence of every record.
pub fn dedup<T: Hash + Eq>(records: Vec<Vec<T>>) -> Vec<Vec<T>> {
    dedup_by_key(records, KeyRange::Full)
}

/// Removes records whose key was already seen, keeping the first occurrence.
pub fn dedup_by_key<T: Hash + Eq>(records: Vec<Vec<T>>, range: KeyRange) -> Vec<Vec<T>> {
    let keep = first_occurrences(records.iter().map(Vec::as_slice), range);
    records.into_iter().zip(keep).filter_map(|(record, keep)| keep.then_some(record)).collect()
}

/// Flags, for every record, whether its key is seen for the first time.
pub fn first_occurrences<'a, T, I>(records: I, range: KeyRange) -> Vec<bool>
where
    T: Hash + Eq + 'a,
    I: IntoIterator<Item = &'a [T]>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if index > 0 && index % PROGRESS_EVERY == 0 {
                debug!("deduplicating, at record {index}");
            }
            seen.insert(range.key(record))
        })
        .collect()
}

impl Dataset {
    /// Collapses records with equal keys to their first occurrence, together
    /// with that occurrence's label.
    pub fn dedup(self, range: KeyRange) -> Dataset {
        let before = self.len();
        let keep = first_occurrences(self.records.iter().map(Vec::as_slice), range);
        let (records, labels) = self
            .records
            .into_iter()
            .zip(self.labels)
            .zip(keep)
            .filter_map(|(pair, keep)| keep.then_some(pair))
            .unzip();

        let dataset = Dataset { records, labels };
        info!("deduplicated {before} records down to {}", dataset.len());
        dataset
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::Value;

    fn ints(rows: &[&[i64]]) -> Vec<Vec<i64>> {
        rows.iter().map(|row| row.to_vec()).collect()
    }

    #[test]
    fn keeps_first_occurrence_order() {
        let records = ints(&[&[1, 2], &[1, 2], &[3, 4]]);
        assert_eq!(dedup(records), ints(&[&[1, 2], &[3, 4]]));

        let records = ints(&[&[5], &[1], &[5], &[2], &[1]]);
        assert_eq!(dedup(records), ints(&[&[5], &[1], &[2]]));
    }

    #[test]
    fn empty_input() {
        assert!(dedup(Vec::<Vec<i64>>::new()).is_empty());
    }

    #[test]
    fn prefix_key_ignores_the_tail() {
        let records = ints(&[&[1, 2, 9], &[1, 2, 8], &[1, 3, 9]]);
        let deduped = dedup_by_key(records, KeyRange::Prefix(2));
        assert_eq!(deduped, ints(&[&[1, 2, 9], &[1, 3, 9]]));
    }

    #[test]
    fn key_range_is_clamped() {
        let record = [1, 2, 3];
        assert_eq!(KeyRange::Prefix(10).key(&record), &[1, 2, 3]);
        assert_eq!(KeyRange::Fields { start: 1, end: 10 }.key(&record), &[2, 3]);
        assert_eq!(KeyRange::Fields { start: 5, end: 10 }.key(&record), &[] as &[i32]);
    }

    #[test]
    fn dataset_keeps_label_of_first_occurrence() {
        let mut dataset = Dataset::new();
        dataset.push(vec![Value::Int(1)], "first");
        dataset.push(vec![Value::Int(1)], "duplicate");
        dataset.push(vec![Value::Int(2)], "second");

        let dataset = dataset.dedup(KeyRange::Full);
        assert_eq!(dataset.records(), &[vec![Value::Int(1)], vec![Value::Int(2)]]);
        assert_eq!(dataset.labels(), &["first", "second"]);
    }
}
