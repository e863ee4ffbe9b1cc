use std::path::{Path, PathBuf};

use crate::sinks::CsvFileSink;
use crate::sources::MeterReadingCsvFileSource;

/// Rows per CSV flush. The whole dataset is a few thousand rows, so this
/// mostly bounds per-flush allocation.
const WRITE_BATCH_SIZE: usize = 512;

/// Handle on the single persisted artifact: the flat reading table.
///
/// Callers must either check `exists()` or go through
/// `service::ensure_dataset_exists` before building a reader; opening a
/// missing file is a fatal source error by design.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn reader_source(&self) -> MeterReadingCsvFileSource {
        MeterReadingCsvFileSource::new(&self.path)
    }

    pub fn writer_sink(&self) -> CsvFileSink {
        CsvFileSink::new(&self.path, WRITE_BATCH_SIZE)
    }
}
