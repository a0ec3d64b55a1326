//! Stage composition for the two sheet kinds.

use babybiome_ingest::SheetPair;
use babybiome_model::{ColumnMapping, ExclusionList};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::canonical::{Canonicalizer, infer_types};
use crate::error::Result;
use crate::exclusion::apply_exclusions;
use crate::rename::apply_mapping;
use crate::rules::{RuleExecutor, RuleStage};
use crate::shape::{normalize_baby_sheet, normalize_general_sheet};
use crate::table::SheetTable;

/// Counts collected while a frame moves through the stages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub rows: usize,
    pub columns: usize,
    pub renamed_columns: usize,
    pub dropped_columns: usize,
    pub raw_text_rules: usize,
    pub canonicalized_cells: usize,
    pub typed_columns: usize,
    pub typed_rules: usize,
    pub excluded_rows: usize,
}

/// Normalize and map every timepoint worksheet, then stack them.
pub fn tidy_baby_sheets(
    pairs: &[SheetPair],
    mapping: &ColumnMapping,
    report: &mut FrameReport,
) -> Result<DataFrame> {
    let mut tables = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let mut table = normalize_baby_sheet(pair)?;
        let outcome = apply_mapping(&mut table, mapping)?;
        report.renamed_columns += outcome.renamed;
        report.dropped_columns += outcome.dropped;
        tables.push(table);
    }
    let df = SheetTable::concat(tables).to_frame()?;
    info!(
        sheets = pairs.len(),
        rows = df.height(),
        columns = df.width(),
        "stacked timepoint worksheets"
    );
    Ok(df)
}

pub fn tidy_general_sheet(
    pair: &SheetPair,
    mapping: &ColumnMapping,
    report: &mut FrameReport,
) -> Result<DataFrame> {
    let mut table = normalize_general_sheet(pair);
    let outcome = apply_mapping(&mut table, mapping)?;
    report.renamed_columns += outcome.renamed;
    report.dropped_columns += outcome.dropped;
    table.to_frame()
}

/// Derive features, canonicalize answers, type the columns and drop
/// excluded rows, in that order.
pub fn process_frame(
    df: &mut DataFrame,
    rules: &RuleExecutor,
    canonicalizer: &Canonicalizer,
    exclusions: &ExclusionList,
    report: &mut FrameReport,
) -> Result<()> {
    report.raw_text_rules = rules.execute(RuleStage::RawText, df)?;
    report.canonicalized_cells = canonicalizer.apply(df)?;
    report.typed_columns = infer_types(df)?;
    report.typed_rules = rules.execute(RuleStage::Typed, df)?;
    report.excluded_rows = apply_exclusions(df, exclusions)?;
    report.rows = df.height();
    report.columns = df.width();
    Ok(())
}
