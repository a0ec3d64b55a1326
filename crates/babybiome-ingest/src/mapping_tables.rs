//! Rename and deletion workbooks.
//!
//! Both are single-sheet workbooks with a header row. The rename workbook
//! has `Old` and `New` columns; the deletion workbook has an `Old` column.
//! They are kept as xlsx because the labels contain umlauts and other
//! characters that were mangled by CSV exports.

use std::path::Path;

use babybiome_model::ColumnMapping;
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use tracing::{debug, info};

use crate::error::{IngestError, Result};
use crate::grid::Cell;

const OLD_COLUMN: &str = "Old";
const NEW_COLUMN: &str = "New";

/// Read `Old` → `New` pairs in workbook order.
pub fn read_rename_table(path: &Path) -> Result<Vec<(String, String)>> {
    let range = first_sheet(path)?;
    let old = header_index(&range, path, OLD_COLUMN)?;
    let new = header_index(&range, path, NEW_COLUMN)?;
    let mut pairs = Vec::new();
    for row in range.rows().skip(1) {
        match (cell_text(row, old), cell_text(row, new)) {
            (Some(old), Some(new)) => pairs.push((old, new)),
            (None, None) => {}
            (old, new) => debug!(?old, ?new, "incomplete rename row skipped"),
        }
    }
    info!(path = %path.display(), count = pairs.len(), "loaded rename table");
    Ok(pairs)
}

/// Read the `Old` column of the deletion workbook.
pub fn read_deletion_table(path: &Path) -> Result<Vec<String>> {
    let range = first_sheet(path)?;
    let old = header_index(&range, path, OLD_COLUMN)?;
    let names: Vec<String> = range
        .rows()
        .skip(1)
        .filter_map(|row| cell_text(row, old))
        .collect();
    info!(path = %path.display(), count = names.len(), "loaded deletion table");
    Ok(names)
}

/// Load both tables into a [`ColumnMapping`].
pub fn load_column_mapping(renames: &Path, deletions: &Path) -> Result<ColumnMapping> {
    Ok(ColumnMapping::new(
        read_rename_table(renames)?,
        read_deletion_table(deletions)?,
    ))
}

fn first_sheet(path: &Path) -> Result<Range<Data>> {
    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|err| IngestError::Workbook {
        path: path.to_path_buf(),
        message: format!("{err}"),
    })?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::Workbook {
            path: path.to_path_buf(),
            message: "workbook has no worksheets".to_string(),
        });
    };
    workbook
        .worksheet_range(&sheet)
        .map_err(|err| IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("failed to read worksheet '{sheet}': {err}"),
        })
}

fn header_index(range: &Range<Data>, path: &Path, column: &str) -> Result<usize> {
    range
        .rows()
        .next()
        .and_then(|header| {
            header
                .iter()
                .position(|cell| Cell::from(cell).render().is_some_and(|name| name.trim() == column))
        })
        .ok_or_else(|| IngestError::MissingMappingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}

fn cell_text(row: &[Data], index: usize) -> Option<String> {
    row.get(index).map(Cell::from).as_ref().and_then(Cell::render)
}
