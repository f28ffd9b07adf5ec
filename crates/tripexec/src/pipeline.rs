//! The dataframe-side aggregate pipeline.

use std::time::Instant;

use polars::prelude::*;

use crate::compare::result_rows;
use crate::dataset::TripDataset;
use crate::errors::{ExecError, Result};
use crate::lookup::{BOROUGH_COLUMN, LOCATION_ID, ZoneLookup};
use crate::timing::PipelineTimes;
use crate::{BOROUGH, TRIPS};

const PICKUP_LOCATION: &str = "PULocationID";

/// A pipeline's materialized result together with its timings.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// `(borough, trips)` rows, sorted ascending by borough, nulls last.
    pub result: DataFrame,
    pub times: PipelineTimes,
}

/// Build the lazy query. Nothing executes until collect.
///
/// Project the pickup location, left join the zone lookup on the location
/// identifier, count per borough, sort. The left join keeps every pickup
/// row; pickups with no lookup entry land in the null-borough group. The key
/// is cast to the lookup's declared key type so partitions written with a
/// narrower integer type still join.
fn build_query(dataset: &TripDataset, zones: &ZoneLookup) -> Result<LazyFrame> {
    let trips = dataset
        .scan()?
        .select([col(PICKUP_LOCATION).cast(DataType::Int64)]);

    let lookup = zones
        .table()
        .clone()
        .lazy()
        .select([col(LOCATION_ID), col(BOROUGH_COLUMN)]);

    let query = trips
        .join(
            lookup,
            [col(PICKUP_LOCATION)],
            [col(LOCATION_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .group_by([col(BOROUGH_COLUMN).alias(BOROUGH)])
        .agg([len().cast(DataType::Int64).alias(TRIPS)])
        .sort([BOROUGH], SortMultipleOptions::default().with_nulls_last(true));

    Ok(query)
}

/// Run the dataframe pipeline `count` times.
///
/// Each run is timed from just before the query is built to just after
/// materialization. Repeat runs must reproduce the first run's result
/// exactly; the input snapshot is immutable, so a divergence means the
/// pipeline itself is nondeterministic.
pub fn run(dataset: &TripDataset, zones: &ZoneLookup, count: usize) -> Result<PipelineOutput> {
    let count = count.max(1);
    let mut runs = Vec::with_capacity(count);

    let start = Instant::now();
    let result = build_query(dataset, zones)?.collect()?;
    runs.push(start.elapsed());

    let first_rows = result_rows(&result)?;
    for run in 1..count {
        let start = Instant::now();
        let repeat = build_query(dataset, zones)?.collect()?;
        runs.push(start.elapsed());

        if result_rows(&repeat)? != first_rows {
            return Err(ExecError::NondeterministicPipeline {
                pipeline: "dataframe",
                run: run + 1,
            });
        }
    }

    tracing::info!(
        groups = result.height(),
        elapsed = ?runs[0],
        runs = runs.len(),
        "dataframe pipeline finished"
    );

    Ok(PipelineOutput {
        result,
        times: PipelineTimes::new(std::time::Duration::ZERO, runs),
    })
}
