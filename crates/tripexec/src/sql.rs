//! The embedded-SQL aggregate pipeline.

use std::path::{Path, PathBuf};
use std::time::Instant;

use duckdb::Connection;
use polars::prelude::*;

use crate::compare::result_rows;
use crate::dataset::TripDataset;
use crate::errors::{ExecError, Result};
use crate::lookup::ZoneLookup;
use crate::pipeline::PipelineOutput;
use crate::timing::PipelineTimes;
use crate::{BOROUGH, TRIPS};

/// Relation names the inputs are registered under.
pub const TRIPS_RELATION: &str = "trips";
pub const ZONES_RELATION: &str = "zones";

/// Same join, grouping and ordering as the dataframe pipeline, expressed as
/// SQL text.
const AGGREGATE_QUERY: &str = "\
SELECT z.Borough AS borough, count(*) AS trips
FROM trips t
LEFT JOIN zones z ON t.PULocationID = z.LocationID
GROUP BY z.Borough
ORDER BY borough ASC NULLS LAST";

/// A scoped connection to the embedded SQL engine.
///
/// The connection is backed by a working database file on disk, created or
/// reused at open. Incidental state only; nothing is persisted that a later
/// run depends on. Dropping the session closes the connection; the explicit
/// [`close`](Self::close) surfaces close errors instead of discarding them.
pub struct SqlSession {
    conn: Option<Connection>,
    db_path: PathBuf,
}

impl SqlSession {
    /// Open (or reuse) the working database file backing the session.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = Connection::open(&db_path)?;
        tracing::debug!(db = %db_path.display(), "opened sql session");
        Ok(SqlSession {
            conn: Some(conn),
            db_path,
        })
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(ExecError::SessionClosed)
    }

    /// Register the trip data and zone lookup under fixed relation names.
    ///
    /// Both are views over the source files, so the engine reads the same
    /// snapshot the dataframe pipeline reads. The lookup's column types are
    /// spelled out for the same reason the dataframe side declares a schema:
    /// an inferred key type can silently break the join.
    pub fn register(&self, dataset: &TripDataset, zones: &ZoneLookup) -> Result<()> {
        let sql = format!(
            "CREATE OR REPLACE VIEW {TRIPS_RELATION} AS \
             SELECT * FROM read_parquet('{}');\n\
             CREATE OR REPLACE VIEW {ZONES_RELATION} AS \
             SELECT * FROM read_csv('{}', header = true, columns = {{\
             'LocationID': 'BIGINT', \
             'Borough': 'VARCHAR', \
             'Zone': 'VARCHAR', \
             'service_zone': 'VARCHAR'}});",
            quote_literal(&dataset.glob()),
            quote_literal(&zones.path().display().to_string()),
        );
        self.conn()?.execute_batch(&sql)?;
        Ok(())
    }

    /// Execute the aggregate query and fetch the rows into the shared
    /// `(borough, trips)` result shape.
    ///
    /// Rows are pulled one at a time into plain vectors rather than through
    /// an Arrow interchange, so the two engines' Arrow versions stay
    /// independent.
    pub fn query_aggregate(&self) -> Result<DataFrame> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(AGGREGATE_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)?))
        })?;

        let mut boroughs: Vec<Option<String>> = Vec::new();
        let mut trips: Vec<i64> = Vec::new();
        for row in rows {
            let (borough, count) = row?;
            boroughs.push(borough);
            trips.push(count);
        }

        let result = df!(BOROUGH => boroughs, TRIPS => trips)?;
        Ok(result)
    }

    /// Close the connection, releasing the working file.
    pub fn close(mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            conn.close().map_err(|(_, err)| err)?;
        }
        Ok(())
    }
}

/// Escape a string for inclusion in a single-quoted SQL literal.
fn quote_literal(s: &str) -> String {
    s.replace('\'', "''")
}

/// Run the SQL pipeline `count` times within one scoped session.
///
/// Registration is one-time setup and timed separately from the query runs.
/// The session is closed on every exit path, including query failure.
pub fn run(
    dataset: &TripDataset,
    zones: &ZoneLookup,
    db_path: impl AsRef<Path>,
    count: usize,
) -> Result<PipelineOutput> {
    let session = SqlSession::open(db_path)?;
    let output = run_in_session(&session, dataset, zones, count);
    let closed = session.close();

    let output = output?;
    closed?;
    Ok(output)
}

fn run_in_session(
    session: &SqlSession,
    dataset: &TripDataset,
    zones: &ZoneLookup,
    count: usize,
) -> Result<PipelineOutput> {
    let count = count.max(1);
    let mut runs = Vec::with_capacity(count);

    let setup_start = Instant::now();
    session.register(dataset, zones)?;
    let setup = setup_start.elapsed();

    let start = Instant::now();
    let result = session.query_aggregate()?;
    runs.push(start.elapsed());

    let first_rows = result_rows(&result)?;
    for run in 1..count {
        let start = Instant::now();
        let repeat = session.query_aggregate()?;
        runs.push(start.elapsed());

        if result_rows(&repeat)? != first_rows {
            return Err(ExecError::NondeterministicPipeline {
                pipeline: "sql",
                run: run + 1,
            });
        }
    }

    tracing::info!(
        groups = result.height(),
        setup = ?setup,
        elapsed = ?runs[0],
        runs = runs.len(),
        "sql pipeline finished"
    );

    Ok(PipelineOutput {
        result,
        times: PipelineTimes::new(setup, runs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_quoting_doubles_single_quotes() {
        assert_eq!(quote_literal("plain/path"), "plain/path");
        assert_eq!(quote_literal("o'brien"), "o''brien");
    }

    #[test]
    fn close_is_an_error_free_noop_for_fresh_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let session = SqlSession::open(dir.path().join("work.duckdb")).unwrap();
        session.close().unwrap();
    }
}
