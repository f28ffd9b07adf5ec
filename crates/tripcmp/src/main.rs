use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use logutil::LogFormat;
use tripexec::compare::Comparison;
use tripexec::dataset::TripDataset;
use tripexec::lookup::ZoneLookup;
use tripexec::report::{self, ReportInputs};
use tripexec::{pipeline, sql};

#[derive(Parser)]
#[clap(name = "tripcmp")]
struct Arguments {
    /// Directory containing the partitioned trip Parquet files.
    #[clap(long)]
    trips: PathBuf,
    /// Zone lookup CSV mapping location identifiers to boroughs.
    #[clap(long)]
    zones: PathBuf,
    /// Working database file for the embedded SQL engine.
    ///
    /// Created or reused; holds no state a later run depends on.
    #[clap(long, default_value = "tripcmp.duckdb")]
    db: PathBuf,
    /// Number of times to run each pipeline.
    #[clap(long, default_value_t = 1)]
    count: usize,
    /// Print each pipeline's raw result table in addition to the report.
    #[clap(long)]
    print_results: bool,
    /// Write the rendered report to a file instead of stdout.
    #[clap(long)]
    output: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Arguments::parse();

    let level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    // Logs go to stderr so stdout stays a clean report.
    logutil::configure_global_logger(level, LogFormat::HumanReadable, io::stderr);

    if let Err(err) = run(args) {
        eprintln!("ERROR: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Arguments) -> anyhow::Result<()> {
    let dataset = TripDataset::open(&args.trips)?;
    let zones = ZoneLookup::load(&args.zones)?;

    let dataset_rows = dataset.row_count()?;
    let dataset_columns = dataset.column_count()?;
    tracing::info!(
        rows = dataset_rows,
        columns = dataset_columns,
        partitions = dataset.partition_count(),
        "opened trip dataset"
    );

    let df_out = pipeline::run(&dataset, &zones, args.count)?;
    let sql_out = sql::run(&dataset, &zones, &args.db, args.count)?;

    if args.print_results {
        println!("dataframe pipeline:");
        println!("{}", fmtutil::pretty_format_frame(&df_out.result, None)?);
        println!("sql pipeline:");
        println!("{}", fmtutil::pretty_format_frame(&sql_out.result, None)?);
    }

    let comparison = Comparison::build(&df_out.result, &sql_out.result)?;
    comparison.verify(dataset_rows)?;

    let rendered = report::render(&ReportInputs {
        trips_dir: &args.trips,
        partition_count: dataset.partition_count(),
        dataset_rows,
        dataset_columns,
        zone_count: zones.len(),
        df_times: &df_out.times,
        sql_times: &sql_out.times,
        comparison: &comparison,
    })?;

    match &args.output {
        Some(path) => std::fs::write(path, &rendered)
            .with_context(|| format!("failed to write report to {}", path.display()))?,
        None => print!("{rendered}"),
    }

    Ok(())
}
