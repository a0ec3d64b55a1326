//! Sheet reshaping: stacked value/notes grids to one row per timepoint.
//!
//! The questionnaire sheets are laid out question-per-row and
//! timepoint-per-column, with cell comments holding free-text remarks. The
//! notes grid is stacked below the value grid, label and empty columns are
//! dropped, and the result is transposed so every question and its
//! `_notes` companion become columns.

use babybiome_ingest::{Cell, SheetPair};
use babybiome_model::{NOTES_SUFFIX, notes_column};
use tracing::{debug, warn};

use crate::error::{Result, TransformError};
use crate::table::SheetTable;

pub const TIME_POINT_COLUMN: &str = "time_point";
pub const FAMILY_COLUMN: &str = "baby";

/// Minimum number of non-empty cells for a grid column to be kept. A
/// timepoint that was never filled in only carries its questionnaire title.
const MIN_FILLED_CELLS: usize = 2;

/// Row of the general sheet holding a sub-header.
const GENERAL_SUBHEADER_ROW: usize = 1;

type Matrix = Vec<Vec<Option<String>>>;

/// Reshape a timepoint worksheet into one row per timepoint with
/// `time_point` first and `baby` last.
pub fn normalize_baby_sheet(pair: &SheetPair) -> Result<SheetTable> {
    let mut matrix = stack(pair);
    drop_first_column(&mut matrix);
    drop_sparse_columns(&mut matrix, MIN_FILLED_CELLS);
    drop_empty_rows(&mut matrix);
    let mut matrix = transpose(&matrix);
    if matrix.is_empty() {
        warn!(sheet = %pair.sheet, "worksheet has no filled timepoints");
        return Ok(SheetTable::default());
    }

    for (index, row) in matrix.iter_mut().enumerate().skip(1) {
        let Some(raw) = row.first().cloned().flatten() else {
            return Err(TransformError::MissingTimePoint {
                sheet: pair.sheet.clone(),
                row: index,
            });
        };
        let mut label = normalize_time_point(&raw);
        if label.is_empty() {
            label = raw.replace("Fragebogen ", "").replace(['"', ' '], "");
            warn!(sheet = %pair.sheet, raw = %raw, label = %label, "time point label truncated to nothing");
        }
        if label.is_empty() {
            return Err(TransformError::MissingTimePoint {
                sheet: pair.sheet.clone(),
                row: index,
            });
        }
        row[0] = Some(label);
        row.push(Some(pair.sheet.clone()));
    }
    if let Some(header) = matrix.first_mut() {
        if let Some(first) = header.first_mut() {
            *first = Some(TIME_POINT_COLUMN.to_string());
        }
        header.push(Some(FAMILY_COLUMN.to_string()));
    }

    let table = promote_header(matrix);
    debug!(
        sheet = %pair.sheet,
        rows = table.height(),
        columns = table.width(),
        "normalized worksheet"
    );
    Ok(table)
}

/// Reshape the general worksheet into one row per family.
pub fn normalize_general_sheet(pair: &SheetPair) -> SheetTable {
    let mut values = rendered(pair.values.rows());
    let mut notes = rendered(pair.notes.rows());
    if values.len() > GENERAL_SUBHEADER_ROW {
        values.remove(GENERAL_SUBHEADER_ROW);
    }
    if notes.len() > GENERAL_SUBHEADER_ROW {
        notes.remove(GENERAL_SUBHEADER_ROW);
    }
    let mut matrix = values;
    matrix.extend(notes);
    drop_first_column(&mut matrix);
    drop_empty_rows(&mut matrix);
    drop_sparse_columns(&mut matrix, 1);
    let table = promote_header(transpose(&matrix));
    debug!(
        rows = table.height(),
        columns = table.width(),
        "normalized general worksheet"
    );
    table
}

/// `"Fragebogen 9Monate Ver2"` → `"9Monate"`.
pub fn normalize_time_point(label: &str) -> String {
    let cleaned = label
        .replace("Fragebogen ", "")
        .replace('"', "")
        .replace(' ', "");
    let mut result = cleaned.as_str();
    for marker in ["Ver", "wied", "Gebu"] {
        if let Some(index) = result.find(marker) {
            result = &result[..index];
        }
    }
    result.to_string()
}

/// Make labels usable as column names: empty labels become `unnamed_<n>`,
/// repeated labels get a `_<n>` suffix. For a `<label>_notes` companion the
/// suffix goes before `_notes`, so `X_1` keeps `X_1_notes` as its companion.
pub fn unique_headers(labels: Vec<Option<String>>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::with_capacity(labels.len());
    for (index, label) in labels.into_iter().enumerate() {
        let base = label
            .map(|label| label.trim().to_string())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| format!("unnamed_{index}"));
        let stem = base
            .strip_suffix(NOTES_SUFFIX)
            .filter(|stem| !stem.is_empty());
        let mut candidate = base.clone();
        let mut suffix = 1;
        while headers.contains(&candidate) {
            candidate = match stem {
                Some(stem) => notes_column(&format!("{stem}_{suffix}")),
                None => format!("{base}_{suffix}"),
            };
            suffix += 1;
        }
        if candidate != base {
            warn!(label = %base, renamed = %candidate, "duplicate column label");
        }
        headers.push(candidate);
    }
    headers
}

fn stack(pair: &SheetPair) -> Matrix {
    let mut matrix = rendered(pair.values.rows());
    matrix.extend(rendered(pair.notes.rows()));
    matrix
}

fn rendered(rows: &[Vec<Cell>]) -> Matrix {
    rows.iter()
        .map(|row| row.iter().map(Cell::render).collect())
        .collect()
}

fn drop_first_column(matrix: &mut Matrix) {
    for row in matrix.iter_mut() {
        if !row.is_empty() {
            row.remove(0);
        }
    }
}

fn drop_sparse_columns(matrix: &mut Matrix, min_filled: usize) {
    let width = matrix.iter().map(Vec::len).max().unwrap_or(0);
    let keep: Vec<bool> = (0..width)
        .map(|column| {
            matrix
                .iter()
                .filter(|row| row.get(column).is_some_and(Option::is_some))
                .count()
                >= min_filled
        })
        .collect();
    for row in matrix.iter_mut() {
        let mut column = 0;
        row.retain(|_| {
            let kept = keep.get(column).copied().unwrap_or(false);
            column += 1;
            kept
        });
    }
}

fn drop_empty_rows(matrix: &mut Matrix) {
    matrix.retain(|row| row.iter().any(Option::is_some));
}

fn transpose(matrix: &Matrix) -> Matrix {
    let width = matrix.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|column| {
            matrix
                .iter()
                .map(|row| row.get(column).cloned().flatten())
                .collect()
        })
        .collect()
}

fn promote_header(mut matrix: Matrix) -> SheetTable {
    if matrix.is_empty() {
        return SheetTable::default();
    }
    let labels = matrix.remove(0);
    SheetTable::new(unique_headers(labels), matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use babybiome_ingest::SheetGrid;

    #[test]
    fn time_point_labels() {
        assert_eq!(normalize_time_point("Fragebogen 9Monate Ver2"), "9Monate");
        assert_eq!(normalize_time_point("Fragebogen \"12 Monate\" wiederholt"), "12Monate");
        assert_eq!(normalize_time_point("Fragebogen Geburt"), "");
        assert_eq!(normalize_time_point("Fragebogen 2Wochen nach Geburt"), "2Wochennach");
    }

    #[test]
    fn duplicate_and_empty_labels() {
        let headers = unique_headers(vec![
            Some("a".into()),
            None,
            Some("a".into()),
            Some(" ".into()),
        ]);
        assert_eq!(headers, vec!["a", "unnamed_1", "a_1", "unnamed_3"]);
    }

    #[test]
    fn repeated_question_keeps_notes_companion() {
        let row = |cells: [&str; 4]| cells.map(Cell::text).to_vec();
        let values = SheetGrid::from_rows(vec![
            row(["", "Zeitpunkt", "Fragebogen 9Monate", "Fragebogen 12Monate"]),
            row(["", "Bemerkung", "a", "b"]),
            row(["", "Bemerkung", "c", "d"]),
        ]);
        let mut notes = SheetGrid::new(values.height(), values.width());
        for (index, label) in ["Zeitpunkt", "Bemerkung", "Bemerkung"].iter().enumerate() {
            notes.set(index, 1, Cell::text(format!("{label}_notes")));
        }
        notes.set(2, 2, Cell::text("zweite"));
        let pair = SheetPair {
            sheet: "B001".to_string(),
            values,
            notes,
        };

        let table = normalize_baby_sheet(&pair).unwrap();
        assert_eq!(
            table.headers,
            vec![
                "time_point",
                "Bemerkung",
                "Bemerkung_1",
                "Zeitpunkt_notes",
                "Bemerkung_notes",
                "Bemerkung_1_notes",
                "baby",
            ]
        );
    }

    #[test]
    fn sparse_columns_dropped() {
        let mut matrix = vec![
            vec![Some("x".to_string()), Some("t".to_string())],
            vec![Some("y".to_string()), None],
        ];
        drop_sparse_columns(&mut matrix, 2);
        assert_eq!(matrix, vec![vec![Some("x".to_string())], vec![Some("y".to_string())]]);
    }
}
