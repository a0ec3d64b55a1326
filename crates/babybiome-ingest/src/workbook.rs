//! Worksheet loading: value grid plus notes grid.

use std::path::Path;

use babybiome_model::notes_column;
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, info};

use crate::comments::read_sheet_comments;
use crate::error::{IngestError, Result};
use crate::grid::{Cell, SheetGrid};

/// Worksheet holding the cross-family questionnaire.
pub const GENERAL_SHEET_NAME: &str = "Fragebogen-allgemein+Geburt";

/// Column holding the question labels in every questionnaire sheet.
const LABEL_COLUMN: usize = 1;

/// Row-aligned value and notes grids of one worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPair {
    pub sheet: String,
    pub values: SheetGrid,
    pub notes: SheetGrid,
}

/// Load a timepoint worksheet (`B###`).
///
/// The notes grid label column carries `<label>_notes` so both grids can be
/// stacked and transposed into value/notes column pairs.
pub fn load_sheet(path: &Path, sheet: &str) -> Result<SheetPair> {
    let values = read_values(path, sheet)?;
    let comments = read_sheet_comments(path, sheet)?;

    let mut notes = SheetGrid::new(values.height(), values.width());
    let mut dropped = 0usize;
    for ((row, column), text) in comments {
        if row < notes.height() && column < notes.width() {
            notes.set(row, column, Cell::text(text));
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        debug!(sheet, dropped, "comments outside the value range ignored");
    }
    label_notes_column(&values, &mut notes);

    info!(
        sheet,
        rows = values.height(),
        columns = values.width(),
        notes = notes.non_empty_count(),
        "loaded worksheet"
    );
    Ok(SheetPair {
        sheet: sheet.to_string(),
        values,
        notes,
    })
}

/// Load the general worksheet. The notes header row repeats the family
/// labels of the value grid.
pub fn load_general_sheet(path: &Path, sheet: &str) -> Result<SheetPair> {
    let mut pair = load_sheet(path, sheet)?;
    for column in (LABEL_COLUMN + 1)..pair.values.width() {
        let label = pair.values.get(0, column).cloned().unwrap_or(Cell::Empty);
        pair.notes.set(0, column, label);
    }
    Ok(pair)
}

/// Worksheet names of the timepoint sheets, `B001`..`B###`, skipping
/// families without a sheet.
pub fn baby_sheet_names(first: u32, last: u32, skip: &[u32]) -> Vec<String> {
    (first..=last)
        .filter(|number| !skip.contains(number))
        .map(|number| format!("B{number:03}"))
        .collect()
}

/// Read the value grid of `sheet`, anchored at A1.
pub fn read_values(path: &Path, sheet: &str) -> Result<SheetGrid> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|err| IngestError::Workbook {
        path: path.to_path_buf(),
        message: format!("{err}"),
    })?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(IngestError::SheetNotFound {
            sheet: sheet.to_string(),
            path: path.to_path_buf(),
        });
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|err| IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("failed to read worksheet '{sheet}': {err}"),
        })?;
    Ok(anchored_grid(&range))
}

fn anchored_grid(range: &Range<Data>) -> SheetGrid {
    let Some((start_row, start_column)) = range.start() else {
        return SheetGrid::default();
    };
    let (start_row, start_column) = (start_row as usize, start_column as usize);
    let mut grid = SheetGrid::new(start_row + range.height(), start_column + range.width());
    for (row_offset, row) in range.rows().enumerate() {
        for (column_offset, value) in row.iter().enumerate() {
            grid.set(
                start_row + row_offset,
                start_column + column_offset,
                Cell::from(value),
            );
        }
    }
    grid
}

fn label_notes_column(values: &SheetGrid, notes: &mut SheetGrid) {
    for row in 0..values.height() {
        let label = values
            .get(row, LABEL_COLUMN)
            .and_then(Cell::render)
            .map_or(Cell::Empty, |label| Cell::Text(notes_column(&label)));
        notes.set(row, LABEL_COLUMN, label);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sheet_names_skip() {
        assert_eq!(
            baby_sheet_names(1, 5, &[2, 4]),
            vec!["B001", "B003", "B005"]
        );
        assert!(baby_sheet_names(3, 2, &[]).is_empty());
    }

    #[test]
    fn notes_labels_follow_values() {
        let values = SheetGrid::from_rows(vec![
            vec![Cell::Empty, Cell::text("Frage"), Cell::text("Fragebogen 9Monate")],
            vec![Cell::Empty, Cell::Empty, Cell::Int(3)],
        ]);
        let mut notes = SheetGrid::new(2, 3);
        label_notes_column(&values, &mut notes);
        assert_eq!(notes.get(0, 1), Some(&Cell::text("Frage_notes")));
        assert_eq!(notes.get(1, 1), Some(&Cell::Empty));
    }
}
