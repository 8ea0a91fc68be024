//! Where raw trip logs come from.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::CityCatalog;
use crate::error::{BikeshareError, Result};
use crate::filter::City;

/// Abstraction over a provider of per-city CSV trip logs.
pub trait TripSource: Send + Sync {
    /// Opens the raw CSV stream for `city`.
    fn open(&self, city: City) -> Result<Box<dyn Read + Send>>;
}

/// Reads `<data_dir>/<file>` where the file name comes from a [`CityCatalog`].
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    data_dir: PathBuf,
    catalog: CityCatalog,
}

impl CsvDirectory {
    pub fn new(data_dir: impl Into<PathBuf>, catalog: CityCatalog) -> Self {
        Self {
            data_dir: data_dir.into(),
            catalog,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, city: City) -> PathBuf {
        self.data_dir.join(self.catalog.file_for(city))
    }
}

impl TripSource for CsvDirectory {
    fn open(&self, city: City) -> Result<Box<dyn Read + Send>> {
        let path = self.path_for(city);
        debug!(city = %city, path = %path.display(), "Opening trip source");

        let file = File::open(&path).map_err(|source| BikeshareError::SourceRead { path, source })?;
        Ok(Box::new(BufReader::new(file)))
    }
}
