//! Text table rendering for in-memory result frames.

use std::fmt::Display;

use comfy_table::{Cell, ContentArrangement, Table};
use polars::prelude::{AnyValue, DataFrame, PolarsError};

const DEFAULT_PRESET: &str = "││──╞═╪╡│    ┬┴┌┐└┘";
const DEFAULT_MAX_ROWS: usize = 20;

/// Pretty format a data frame as a bordered text table.
///
/// Rows beyond `max_rows` (default 20) are elided: the head and tail halves
/// are shown with a single ellipsis row between them. Pass `Some(0)` to
/// render every row.
pub fn pretty_format_frame(
    df: &DataFrame,
    max_rows: Option<usize>,
) -> Result<impl Display, PolarsError> {
    let mut table = default_table();
    if df.width() == 0 {
        return Ok(table);
    }

    table.set_header(
        df.get_column_names()
            .iter()
            .map(|name| Cell::new(name.as_str())),
    );

    let total_rows = df.height();
    let mut max_rows = max_rows.unwrap_or(DEFAULT_MAX_ROWS);
    if max_rows == 0 || max_rows > total_rows {
        max_rows = total_rows;
    }

    let (head, tail) = if max_rows < total_rows {
        (max_rows / 2 + max_rows % 2, max_rows / 2)
    } else {
        (total_rows, 0)
    };

    for idx in 0..head {
        table.add_row(format_row(df, idx)?);
    }

    if head + tail < total_rows {
        table.add_row(df.get_columns().iter().map(|_| Cell::new("…")));
    }

    for idx in (total_rows - tail)..total_rows {
        table.add_row(format_row(df, idx)?);
    }

    Ok(table)
}

fn default_table() -> Table {
    let mut table = Table::new();
    table.load_preset(DEFAULT_PRESET);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn format_row(df: &DataFrame, idx: usize) -> Result<Vec<Cell>, PolarsError> {
    df.get_columns()
        .iter()
        .map(|column| Ok(Cell::new(format_value(&column.get(idx)?))))
        .collect()
}

fn format_value(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => "NULL".to_string(),
        AnyValue::String(v) => v.to_string(),
        AnyValue::StringOwned(v) => v.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use super::*;

    #[test]
    fn renders_headers_and_nulls() {
        let df = df!(
            "borough" => [Some("Manhattan"), None::<&str>],
            "trips" => [3i64, 2],
        )
        .unwrap();

        let rendered = pretty_format_frame(&df, None).unwrap().to_string();
        assert!(rendered.contains("borough"));
        assert!(rendered.contains("Manhattan"));
        assert!(rendered.contains("NULL"));
        assert!(!rendered.contains('…'));
    }

    #[test]
    fn elides_rows_beyond_max() {
        let ids: Vec<i64> = (0..50).collect();
        let df = df!("id" => ids).unwrap();

        let rendered = pretty_format_frame(&df, Some(4)).unwrap().to_string();
        assert!(rendered.contains('…'));
        // Head and tail survive the split.
        assert!(rendered.contains(" 0 "));
        assert!(rendered.contains("49"));
    }

    #[test]
    fn zero_max_rows_renders_everything() {
        let ids: Vec<i64> = (0..30).collect();
        let df = df!("id" => ids).unwrap();

        let rendered = pretty_format_frame(&df, Some(0)).unwrap().to_string();
        assert!(!rendered.contains('…'));
        assert!(rendered.contains("29"));
    }
}
