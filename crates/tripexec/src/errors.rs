use std::path::PathBuf;

use polars::prelude::PolarsError;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Path does not exist or is not readable: {0}")]
    MissingPath(PathBuf),

    #[error("No Parquet partitions found under: {0}")]
    EmptyDataset(PathBuf),

    #[error("SQL session already closed")]
    SessionClosed,

    #[error("{pipeline} pipeline produced a different result on repeat run {run}")]
    NondeterministicPipeline { pipeline: &'static str, run: usize },

    #[error("Aggregate results diverge for borough '{borough}': dataframe={df}, sql={sql}")]
    ResultMismatch {
        borough: String,
        df: String,
        sql: String,
    },

    #[error(
        "Group counts do not cover the dataset: {dataset_rows} rows, \
         dataframe total {df_total}, sql total {sql_total}"
    )]
    TotalMismatch {
        dataset_rows: i64,
        df_total: i64,
        sql_total: i64,
    },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    DuckDb(#[from] duckdb::Error),

    #[error(transparent)]
    FmtError(#[from] std::fmt::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

pub type Result<T, E = ExecError> = std::result::Result<T, E>;
