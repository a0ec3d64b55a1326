//! Questionnaire workbook ingestion.
//!
//! Reads worksheets into raw value and notes grids, enumerates the
//! timepoint worksheets, and loads the rename and deletion workbooks.

pub mod comments;
pub mod error;
pub mod grid;
pub mod mapping_tables;
pub mod polars_utils;
pub mod workbook;

pub use comments::{CellComments, parse_cell_ref, read_sheet_comments};
pub use error::{IngestError, Result};
pub use grid::{Cell, SheetGrid};
pub use mapping_tables::{load_column_mapping, read_deletion_table, read_rename_table};
pub use polars_utils::{
    any_to_bool, any_to_date, any_to_f64, any_to_i64, any_to_string, any_to_string_non_empty,
    date_to_days, days_to_date, format_numeric, parse_bool, parse_date, parse_f64, parse_i64,
};
pub use workbook::{
    GENERAL_SHEET_NAME, SheetPair, baby_sheet_names, load_general_sheet, load_sheet, read_values,
};
