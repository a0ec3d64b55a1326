//! All-text table stage between sheet normalization and typing.

use polars::prelude::{Column, DataFrame, NamedFrom, Series};

use crate::error::Result;

/// Header row plus rows of optional cell texts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let index = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).and_then(|value| value.as_deref()))
                .collect(),
        )
    }

    /// Remove the named columns. Names not in the table are ignored.
    /// Returns the number of removed columns.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> usize {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|header| !names.iter().any(|name| name.as_ref() == header))
            .collect();
        let removed = keep.iter().filter(|keep| !**keep).count();
        if removed == 0 {
            return 0;
        }
        self.headers = retain_by(&self.headers, &keep);
        for row in &mut self.rows {
            *row = retain_by(row, &keep);
        }
        removed
    }

    /// Stack tables on the union of their headers, in first-seen order.
    pub fn concat(tables: Vec<SheetTable>) -> SheetTable {
        let mut headers: Vec<String> = Vec::new();
        for table in &tables {
            for header in &table.headers {
                if !headers.contains(header) {
                    headers.push(header.clone());
                }
            }
        }
        let mut rows = Vec::with_capacity(tables.iter().map(SheetTable::height).sum());
        for table in tables {
            let positions: Vec<usize> = table
                .headers
                .iter()
                .filter_map(|header| headers.iter().position(|name| name == header))
                .collect();
            for row in table.rows {
                let mut merged = vec![None; headers.len()];
                for (value, position) in row.into_iter().zip(&positions) {
                    merged[*position] = value;
                }
                rows.push(merged);
            }
        }
        SheetTable { headers, rows }
    }

    /// Build a frame of String columns.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let values: Vec<Option<String>> = self
                    .rows
                    .iter()
                    .map(|row| row.get(index).cloned().flatten())
                    .collect();
                Series::new(header.as_str().into(), values).into()
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

fn retain_by<T: Clone>(values: &[T], keep: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(keep)
        .filter(|(_, keep)| **keep)
        .map(|(value, _)| value.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    #[test]
    fn concat_unions_headers() {
        let first = SheetTable::new(
            vec!["time_point".into(), "a".into()],
            vec![vec![text("3Monate"), text("x")]],
        );
        let second = SheetTable::new(
            vec!["time_point".into(), "b".into()],
            vec![vec![text("9Monate"), text("y")]],
        );
        let merged = SheetTable::concat(vec![first, second]);
        assert_eq!(merged.headers, vec!["time_point", "a", "b"]);
        assert_eq!(merged.rows[1], vec![text("9Monate"), None, text("y")]);
    }

    #[test]
    fn drop_columns_ignores_unknown() {
        let mut table = SheetTable::new(
            vec!["a".into(), "b".into()],
            vec![vec![text("1"), text("2")]],
        );
        assert_eq!(table.drop_columns(&["b", "zzz"]), 1);
        assert_eq!(table.headers, vec!["a"]);
        assert_eq!(table.rows[0], vec![text("1")]);
    }

    #[test]
    fn frame_has_string_columns() {
        let table = SheetTable::new(
            vec!["a".into()],
            vec![vec![text("1")], vec![None]],
        );
        let df = table.to_frame().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("a").unwrap().null_count(), 1);
    }
}
