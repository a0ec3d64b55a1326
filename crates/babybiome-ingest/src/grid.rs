//! Raw worksheet grids.
//!
//! A [`SheetGrid`] is the cell matrix of one worksheet anchored at A1, with
//! no header semantics. Values and notes are both represented as grids so
//! the shape normalizer can stack them.

use calamine::Data;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::polars_utils::format_numeric;

/// One worksheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// Text rendering used once the sheet is reduced to strings.
    pub fn render(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(text) if text.is_empty() => None,
            Cell::Text(text) => Some(text.clone()),
            Cell::Int(value) => Some(value.to_string()),
            Cell::Float(value) => Some(format_numeric(*value)),
            Cell::Bool(true) => Some("True".to_string()),
            Cell::Bool(false) => Some("False".to_string()),
            Cell::Date(date) => Some(date.format("%Y-%m-%d").to_string()),
            Cell::DateTime(datetime) => Some(datetime.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(text) => Cell::text(text.clone()),
            Data::Int(value) => Cell::Int(*value),
            Data::Float(value) => Cell::Float(*value),
            Data::Bool(value) => Cell::Bool(*value),
            Data::DateTime(excel) => {
                if excel.is_duration() {
                    return Cell::Float(excel.as_f64());
                }
                match excel.as_datetime() {
                    Some(datetime) => datetime_cell(datetime),
                    None => Cell::Float(excel.as_f64()),
                }
            }
            Data::DateTimeIso(text) => parse_iso(text),
            Data::DurationIso(text) => Cell::text(text.clone()),
        }
    }
}

fn datetime_cell(datetime: NaiveDateTime) -> Cell {
    if datetime.time() == NaiveTime::MIN {
        Cell::Date(datetime.date())
    } else {
        Cell::DateTime(datetime)
    }
}

fn parse_iso(text: &str) -> Cell {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return datetime_cell(datetime);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Cell::Date(date);
    }
    Cell::text(text)
}

/// Rectangular cell matrix. All rows have the same width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl SheetGrid {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            rows: vec![vec![Cell::Empty; width]; height],
            width,
        }
    }

    /// Build from ragged rows, padding with empty cells.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Empty);
                row
            })
            .collect();
        Self { rows, width }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    /// Overwrite a cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, column: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
            *slot = cell;
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<Cell>> {
        self.rows
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    pub fn non_empty_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_formats() {
        assert_eq!(Cell::Float(3.0).render().as_deref(), Some("3"));
        assert_eq!(Cell::Float(2.5).render().as_deref(), Some("2.5"));
        assert_eq!(Cell::Bool(true).render().as_deref(), Some("True"));
        assert_eq!(Cell::text("").render(), None);
        let date = NaiveDate::from_ymd_opt(2021, 3, 4).unwrap();
        assert_eq!(Cell::Date(date).render().as_deref(), Some("2021-03-04"));
    }

    #[test]
    fn iso_dates_drop_midnight() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 31).unwrap();
        assert_eq!(parse_iso("2020-01-31T00:00:00"), Cell::Date(date));
        assert_eq!(parse_iso("not a date"), Cell::text("not a date"));
    }

    #[test]
    fn from_rows_pads() {
        let grid = SheetGrid::from_rows(vec![vec![Cell::Int(1)], vec![]]);
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.get(1, 0), Some(&Cell::Empty));
        assert_eq!(grid.non_empty_count(), 1);
    }
}
