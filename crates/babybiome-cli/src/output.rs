//! Dated CSV output.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::info;

/// Which questionnaire a CSV holds; names the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    BabySheets,
    GeneralSheet,
}

impl SheetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SheetKind::BabySheets => "baby_sheets",
            SheetKind::GeneralSheet => "general_sheet",
        }
    }
}

/// `<dir>/<YYYYMMDD>_<kind>.csv`
pub fn dated_csv_path(dir: &Path, kind: SheetKind, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.csv", date.format("%Y%m%d"), kind.as_str()))
}

/// Write `df` with a header row and no index column.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output directory {}", parent.display()))?;
    }
    let mut file =
        File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(df)
        .with_context(|| format!("write {}", path.display()))?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "wrote csv"
    );
    Ok(())
}

/// Write today's CSV for `kind` into `dir`.
pub fn write_dated_csv(df: &mut DataFrame, dir: &Path, kind: SheetKind) -> Result<PathBuf> {
    let path = dated_csv_path(dir, kind, Local::now().date_naive());
    write_csv(df, &path)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_carries_date_and_kind() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            dated_csv_path(Path::new("out"), SheetKind::GeneralSheet, date),
            Path::new("out").join("20240305_general_sheet.csv")
        );
    }
}
