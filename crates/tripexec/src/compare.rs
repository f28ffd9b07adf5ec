//! Alignment and verification of the two pipelines' results.

use polars::prelude::*;

use crate::errors::{ExecError, Result};
use crate::{BOROUGH, TRIPS};

/// Column names in the combined comparison table.
pub const TRIPS_DF: &str = "trips_df";
pub const TRIPS_SQL: &str = "trips_sql";

/// Label standing in for the null-borough group during alignment.
///
/// Each pipeline keeps unmatched pickups under a null borough. Nulls are not
/// equal to each other under join semantics, so both tables substitute this
/// label right before the outer join; the unmatched groups then align like
/// any other borough.
pub const UNMATCHED_LABEL: &str = "(unmatched)";

/// The two result tables aligned by borough.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// `(borough, trips_df, trips_sql)`, sorted ascending by borough. A
    /// borough missing from one side leaves a null in that side's column.
    pub combined: DataFrame,
}

impl Comparison {
    /// Outer-align the dataframe-side and SQL-side results by borough.
    pub fn build(df_result: &DataFrame, sql_result: &DataFrame) -> Result<Self> {
        let left = labeled(df_result, TRIPS_DF);
        let right = labeled(sql_result, TRIPS_SQL);

        let combined = left
            .join(
                right,
                [col(BOROUGH)],
                [col(BOROUGH)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .sort([BOROUGH], SortMultipleOptions::default())
            .collect()?;

        Ok(Comparison { combined })
    }

    /// Check the one property the whole comparison exists for: both
    /// pipelines produced identical `(borough, count)` sets, and together
    /// the groups account for every row of the dataset.
    pub fn verify(&self, dataset_rows: i64) -> Result<()> {
        let boroughs = self.combined.column(BOROUGH)?.as_materialized_series();
        let boroughs = boroughs.str()?;
        let df_counts = self.combined.column(TRIPS_DF)?.as_materialized_series();
        let df_counts = df_counts.i64()?;
        let sql_counts = self.combined.column(TRIPS_SQL)?.as_materialized_series();
        let sql_counts = sql_counts.i64()?;

        let mut df_total = 0i64;
        let mut sql_total = 0i64;
        for idx in 0..self.combined.height() {
            let borough = boroughs.get(idx).unwrap_or(UNMATCHED_LABEL);
            match (df_counts.get(idx), sql_counts.get(idx)) {
                (Some(df), Some(sql)) if df == sql => {
                    df_total += df;
                    sql_total += sql;
                }
                (df, sql) => {
                    return Err(ExecError::ResultMismatch {
                        borough: borough.to_string(),
                        df: fmt_count(df),
                        sql: fmt_count(sql),
                    });
                }
            }
        }

        if df_total != dataset_rows || sql_total != dataset_rows {
            return Err(ExecError::TotalMismatch {
                dataset_rows,
                df_total,
                sql_total,
            });
        }

        Ok(())
    }

    /// Number of aligned borough groups.
    pub fn group_count(&self) -> usize {
        self.combined.height()
    }
}

fn labeled(result: &DataFrame, trips_alias: &str) -> LazyFrame {
    result.clone().lazy().select([
        col(BOROUGH).fill_null(lit(UNMATCHED_LABEL)),
        col(TRIPS).cast(DataType::Int64).alias(trips_alias),
    ])
}

fn fmt_count(count: Option<i64>) -> String {
    match count {
        Some(count) => count.to_string(),
        None => "absent".to_string(),
    }
}

/// Extract a result table's `(borough, trips)` rows in order.
pub fn result_rows(result: &DataFrame) -> Result<Vec<(Option<String>, i64)>> {
    let boroughs = result.column(BOROUGH)?.as_materialized_series();
    let boroughs = boroughs.str()?;
    let trips = result.column(TRIPS)?.as_materialized_series();
    let trips = trips.cast(&DataType::Int64)?;
    let trips = trips.i64()?;

    let mut rows = Vec::with_capacity(result.height());
    for idx in 0..result.height() {
        rows.push((
            boroughs.get(idx).map(str::to_string),
            trips.get(idx).unwrap_or_default(),
        ));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(boroughs: Vec<Option<&str>>, trips: Vec<i64>) -> DataFrame {
        df!(BOROUGH => boroughs, TRIPS => trips).unwrap()
    }

    #[test]
    fn matching_results_verify() {
        let a = result(vec![Some("Brooklyn"), Some("Manhattan"), None], vec![1, 3, 2]);
        let b = result(vec![Some("Brooklyn"), Some("Manhattan"), None], vec![1, 3, 2]);

        let comparison = Comparison::build(&a, &b).unwrap();
        comparison.verify(6).unwrap();
        assert_eq!(comparison.group_count(), 3);
    }

    #[test]
    fn count_difference_is_a_mismatch() {
        let a = result(vec![Some("Brooklyn"), Some("Manhattan")], vec![1, 3]);
        let b = result(vec![Some("Brooklyn"), Some("Manhattan")], vec![1, 4]);

        let comparison = Comparison::build(&a, &b).unwrap();
        let err = comparison.verify(4).unwrap_err();
        match err {
            ExecError::ResultMismatch { borough, df, sql } => {
                assert_eq!(borough, "Manhattan");
                assert_eq!(df, "3");
                assert_eq!(sql, "4");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn borough_missing_from_one_side_is_a_mismatch() {
        let a = result(vec![Some("Brooklyn"), Some("Queens")], vec![1, 2]);
        let b = result(vec![Some("Brooklyn")], vec![1]);

        let comparison = Comparison::build(&a, &b).unwrap();
        let err = comparison.verify(3).unwrap_err();
        assert!(matches!(err, ExecError::ResultMismatch { .. }));
    }

    #[test]
    fn uncovered_rows_fail_the_total_check() {
        let a = result(vec![Some("Brooklyn")], vec![1]);
        let b = result(vec![Some("Brooklyn")], vec![1]);

        let comparison = Comparison::build(&a, &b).unwrap();
        let err = comparison.verify(2).unwrap_err();
        assert!(matches!(err, ExecError::TotalMismatch { .. }));
    }

    #[test]
    fn null_groups_align_under_the_sentinel() {
        let a = result(vec![Some("Manhattan"), None], vec![1, 2]);
        let b = result(vec![Some("Manhattan"), None], vec![1, 2]);

        let comparison = Comparison::build(&a, &b).unwrap();
        comparison.verify(3).unwrap();

        let rows = result_rows_combined(&comparison.combined);
        assert!(rows.iter().any(|(b, _, _)| b == UNMATCHED_LABEL));
    }

    fn result_rows_combined(combined: &DataFrame) -> Vec<(String, i64, i64)> {
        let boroughs = combined.column(BOROUGH).unwrap().as_materialized_series();
        let boroughs = boroughs.str().unwrap();
        let df_counts = combined.column(TRIPS_DF).unwrap().as_materialized_series();
        let df_counts = df_counts.i64().unwrap();
        let sql_counts = combined.column(TRIPS_SQL).unwrap().as_materialized_series();
        let sql_counts = sql_counts.i64().unwrap();

        (0..combined.height())
            .map(|idx| {
                (
                    boroughs.get(idx).unwrap().to_string(),
                    df_counts.get(idx).unwrap(),
                    sql_counts.get(idx).unwrap(),
                )
            })
            .collect()
    }
}
