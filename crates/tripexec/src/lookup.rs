//! Zone lookup table ingestion.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use polars::prelude::*;

use crate::errors::{ExecError, Result};

pub const LOCATION_ID: &str = "LocationID";
pub const BOROUGH_COLUMN: &str = "Borough";

/// The zone lookup table, fully materialized.
///
/// Maps a location identifier to its borough, zone name and service-zone
/// classification.
#[derive(Debug, Clone)]
pub struct ZoneLookup {
    path: PathBuf,
    table: DataFrame,
}

impl ZoneLookup {
    /// Declared column types for the lookup file.
    ///
    /// The schema is explicit rather than inferred: inference on a small
    /// file can type the key column differently from the trip data's key,
    /// which would silently empty the join instead of failing.
    pub fn schema() -> Schema {
        Schema::from_iter([
            Field::new(LOCATION_ID.into(), DataType::Int64),
            Field::new(BOROUGH_COLUMN.into(), DataType::String),
            Field::new("Zone".into(), DataType::String),
            Field::new("service_zone".into(), DataType::String),
        ])
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExecError::MissingPath(path.to_path_buf()));
        }

        let table = CsvReadOptions::default()
            .with_has_header(true)
            .with_schema(Some(Arc::new(Self::schema())))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()?;

        tracing::debug!(path = %path.display(), zones = table.height(), "loaded zone lookup");

        Ok(ZoneLookup {
            path: path.to_path_buf(),
            table,
        })
    }

    /// Source file path, for engines that register the lookup by path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn table(&self) -> &DataFrame {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.table.height()
    }

    pub fn is_empty(&self) -> bool {
        self.table.height() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_column_is_declared_as_i64() {
        let schema = ZoneLookup::schema();
        assert_eq!(schema.get(LOCATION_ID), Some(&DataType::Int64));
        assert_eq!(schema.get(BOROUGH_COLUMN), Some(&DataType::String));
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = ZoneLookup::load("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, ExecError::MissingPath(_)));
    }
}
