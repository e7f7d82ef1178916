use std::fs::File;
use std::marker::PhantomData;
use std::mem;
use std::path::Path;

use bytemuck::{AnyBitPattern, PodCastError};
use memmap2::Mmap;
use tracing::info;

use crate::error::{Error, Result};
use crate::record::{Dataset, Value};
use crate::source::RecordSource;

/// A flat matrix file of little-endian `T`, `dimensions` values per row,
/// with no header.
pub struct MatLEView<T> {
    name: &'static str,
    mmap: Mmap,
    dimensions: usize,
    _marker: PhantomData<T>,
}

impl<T: AnyBitPattern> MatLEView<T> {
    pub fn open(name: &'static str, path: &Path, dimensions: usize) -> Result<MatLEView<T>> {
        if dimensions == 0 {
            return Err(Error::InvalidInput("a matrix needs at least one dimension".into()));
        }
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let row_size = dimensions * mem::size_of::<T>();
        if mmap.len() % row_size != 0 {
            return Err(Error::InvalidInput(format!(
                "{} is {} bytes long, not a multiple of {row_size} bytes per row",
                path.display(),
                mmap.len()
            )));
        }
        Ok(MatLEView { name, mmap, dimensions, _marker: PhantomData })
    }

    pub fn header(&self) {
        info!("{} - {} vectors of {} dimensions", self.name, self.len(), self.dimensions);
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        (self.mmap.len() / mem::size_of::<T>()) / self.dimensions
    }

    pub fn get(&self, index: usize) -> Option<std::result::Result<&[T], PodCastError>> {
        let tsize = mem::size_of::<T>();
        let start = index * self.dimensions;
        let end = start + self.dimensions;
        if end * tsize <= self.mmap.len() {
            let bytes = &self.mmap[start * tsize..end * tsize];
            Some(bytemuck::try_cast_slice::<u8, T>(bytes))
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = std::result::Result<&[T], PodCastError>> {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

impl RecordSource for MatLEView<f32> {
    fn name(&self) -> &str {
        self.name
    }

    fn load(&self) -> Result<Dataset> {
        self.header();
        let mut records = Vec::with_capacity(self.len());
        for row in self.iter() {
            let row = row.map_err(|e| Error::InvalidInput(format!("{}: {e}", self.name)))?;
            records.push(row.iter().copied().map(Value::Float).collect());
        }
        Ok(Dataset::unlabeled(records))
    }
}
