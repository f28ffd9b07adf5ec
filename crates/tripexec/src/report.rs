//! Narrative report rendering.
//!
//! The report interleaves prose with the computed values: dataset shape, the
//! two pipelines' timings, and the aligned comparison table. Plain text,
//! suitable for a terminal or for saving alongside the data.

use std::fmt::Write;
use std::path::Path;
use std::time::Duration;

use crate::compare::Comparison;
use crate::errors::Result;
use crate::timing::PipelineTimes;

/// Everything the report interpolates.
#[derive(Debug)]
pub struct ReportInputs<'a> {
    pub trips_dir: &'a Path,
    pub partition_count: usize,
    pub dataset_rows: i64,
    pub dataset_columns: usize,
    pub zone_count: usize,
    pub df_times: &'a PipelineTimes,
    pub sql_times: &'a PipelineTimes,
    pub comparison: &'a Comparison,
}

pub fn render(inputs: &ReportInputs) -> Result<String> {
    let mut out = String::new();

    writeln!(out, "# Trips per borough: dataframe pipeline vs. embedded SQL")?;
    writeln!(out)?;
    writeln!(
        out,
        "The trip data at `{}` spans {} partition file{} holding {} rows across \
         {} columns. The zone lookup resolves {} location identifiers to boroughs.",
        inputs.trips_dir.display(),
        inputs.partition_count,
        plural(inputs.partition_count),
        inputs.dataset_rows,
        inputs.dataset_columns,
        inputs.zone_count,
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Counting trips per borough through the lazy dataframe pipeline took {}.",
        describe_times(inputs.df_times),
    )?;
    writeln!(
        out,
        "The same aggregate through the embedded SQL engine took {}{}.",
        describe_times(inputs.sql_times),
        describe_setup(inputs.sql_times.setup),
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        fmtutil::pretty_format_frame(&inputs.comparison.combined, None)?
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Both paths attribute all {} rows to {} borough group{}, and their counts \
         agree exactly.",
        inputs.dataset_rows,
        inputs.comparison.group_count(),
        plural(inputs.comparison.group_count()),
    )?;

    Ok(out)
}

fn describe_times(times: &PipelineTimes) -> String {
    match times.runs.as_slice() {
        [single] => format!("{:.2?}", single),
        runs => format!(
            "{:.2?} on average over {} runs (min {:.2?}, max {:.2?})",
            times.run_avg(),
            runs.len(),
            times.run_min(),
            times.run_max(),
        ),
    }
}

fn describe_setup(setup: Duration) -> String {
    if setup.is_zero() {
        String::new()
    } else {
        format!(" (relation registration: {setup:.2?})")
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}
