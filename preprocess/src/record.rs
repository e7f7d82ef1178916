use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

/// A single scalar field of a record.
///
/// Fields read from text stay [`Value::Raw`]: they compare, hash and print
/// as the token found in the input, so `0.1000000001` and `0.1000000002`
/// stay distinct and `007` is written back as `007`. Numeric variants hold
/// values decoded from binary inputs; their floats compare and hash by bit
/// pattern, so `NaN` equals itself and `0.0` differs from `-0.0`.
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Float(f32),
    Raw(String),
}

impl Value {
    /// Keeps a field read from text, without its surrounding whitespace.
    pub fn parse(token: &str) -> Value {
        Value::Raw(token.trim().to_owned())
    }

    /// The numeric value of the field, `None` for non-numeric text.
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Int(int) => Some(*int as f32),
            Value::Float(float) => Some(*float),
            Value::Raw(token) => token.parse().ok(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(left), Value::Int(right)) => left == right,
            (Value::Float(left), Value::Float(right)) => left.to_bits() == right.to_bits(),
            (Value::Raw(left), Value::Raw(right)) => left == right,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Int(int) => int.hash(state),
            Value::Float(float) => float.to_bits().hash(state),
            Value::Raw(token) => token.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(int) => write!(f, "{int}"),
            Value::Float(float) => write!(f, "{float}"),
            Value::Raw(token) => f.write_str(token),
        }
    }
}

impl From<i64> for Value {
    fn from(int: i64) -> Self {
        Value::Int(int)
    }
}

impl From<f32> for Value {
    fn from(float: f32) -> Self {
        Value::Float(float)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Raw(text.to_owned())
    }
}

/// One fixed-width data point.
pub type Record = Vec<Value>;

/// The class attached to a record, kept as its textual form.
pub type Label = String;

/// The label written for datasets that carry no class information.
pub const NO_LABEL: &str = "0";

/// An in-memory sequence of labeled records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub(crate) records: Vec<Record>,
    pub(crate) labels: Vec<Label>,
}

impl Dataset {
    pub fn new() -> Dataset {
        Dataset::default()
    }

    pub fn from_parts(records: Vec<Record>, labels: Vec<Label>) -> Result<Dataset> {
        if records.len() != labels.len() {
            return Err(Error::InvalidInput(format!(
                "{} records but {} labels",
                records.len(),
                labels.len()
            )));
        }
        Ok(Dataset { records, labels })
    }

    /// Builds a dataset where every record carries [`NO_LABEL`].
    pub fn unlabeled(records: Vec<Record>) -> Dataset {
        let labels = vec![NO_LABEL.to_owned(); records.len()];
        Dataset { records, labels }
    }

    pub fn push(&mut self, record: Record, label: impl Into<Label>) {
        self.records.push(record);
        self.labels.push(label.into());
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Width of the first record, `None` when empty.
    pub fn dimensions(&self) -> Option<usize> {
        self.records.first().map(Vec::len)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut [Label] {
        &mut self.labels
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Record, &Label)> {
        self.records.iter().zip(&self.labels)
    }

    pub fn into_parts(self) -> (Vec<Record>, Vec<Label>) {
        (self.records, self.labels)
    }
}
