//! Compare a dataframe-style lazy pipeline against an embedded SQL engine
//! over the same partitioned trip data.
//!
//! The two paths express the same query: project the pickup location, left
//! join the zone lookup, count trips per borough, sort by borough. Each path
//! is timed, and the result sets must match exactly.

pub mod compare;
pub mod dataset;
pub mod errors;
pub mod lookup;
pub mod pipeline;
pub mod report;
pub mod sql;
pub mod timing;

/// Column names shared by both pipelines' result tables.
pub const BOROUGH: &str = "borough";
pub const TRIPS: &str = "trips";
