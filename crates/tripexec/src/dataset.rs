//! Partitioned Parquet dataset access.

use std::path::{Path, PathBuf};

use polars::prelude::*;

use crate::errors::{ExecError, Result};

/// Handle to a directory of partitioned Parquet files treated as one logical
/// table.
///
/// Opening only lists the partition files; no data is read until one of the
/// count accessors or a pipeline materializes a query.
#[derive(Debug, Clone)]
pub struct TripDataset {
    dir: PathBuf,
    partitions: Vec<PathBuf>,
}

impl TripDataset {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ExecError::MissingPath(dir.to_path_buf()));
        }

        let mut partitions = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "parquet") {
                partitions.push(path);
            }
        }
        // Deterministic partition order regardless of directory iteration.
        partitions.sort();

        if partitions.is_empty() {
            return Err(ExecError::EmptyDataset(dir.to_path_buf()));
        }

        tracing::debug!(
            dir = %dir.display(),
            partitions = partitions.len(),
            "opened trip dataset"
        );

        Ok(TripDataset {
            dir: dir.to_path_buf(),
            partitions,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    /// Glob pattern covering every partition file, for engines that register
    /// tables by path pattern.
    pub fn glob(&self) -> String {
        format!("{}/*.parquet", self.dir.display())
    }

    /// Lazy scan over all partitions. Only the columns a query touches are
    /// read, and nothing is read until a collect.
    pub fn scan(&self) -> Result<LazyFrame> {
        let lf = LazyFrame::scan_parquet(self.glob(), ScanArgsParquet::default())?;
        Ok(lf)
    }

    /// Logical row count across all partitions, computed without
    /// materializing any data column.
    pub fn row_count(&self) -> Result<i64> {
        let counted = self
            .scan()?
            .select([len().cast(DataType::Int64).alias("rows")])
            .collect()?;
        let rows = counted
            .column("rows")?
            .as_materialized_series()
            .i64()?
            .get(0)
            .unwrap_or_default();
        Ok(rows)
    }

    /// Number of columns in the logical table, from the merged schema.
    pub fn column_count(&self) -> Result<usize> {
        let mut lf = self.scan()?;
        let schema = lf.collect_schema()?;
        Ok(schema.len())
    }
}
