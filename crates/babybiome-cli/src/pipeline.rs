//! Pipeline stages, each run inside its own span.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use babybiome_db::{LoadSummary, RelationalLoader};
use babybiome_ingest::{SheetPair, load_column_mapping, load_general_sheet, load_sheet};
use babybiome_model::{ColumnMapping, ExclusionList, RoleFields};
use babybiome_transform::{
    Canonicalizer, FrameReport, MemberSample, baby_sheet_rules, fan_out, general_sheet_rules,
    process_frame, tidy_baby_sheets, tidy_general_sheet,
};
use polars::prelude::DataFrame;
use tracing::{info, info_span, trace};

use crate::logging::redact_value;

pub fn load_mapping(renames: &Path, deletions: &Path) -> Result<ColumnMapping> {
    info_span!("mapping").in_scope(|| {
        let mapping = load_column_mapping(renames, deletions).context("load column mapping")?;
        info!(
            renames = mapping.renames.len(),
            deletions = mapping.deletions.len(),
            "loaded column mapping"
        );
        Ok(mapping)
    })
}

/// Read the exclusion TOML, or fall back to the built-in list.
pub fn load_exclusions(path: Option<&Path>) -> Result<ExclusionList> {
    match path {
        Some(path) => ExclusionList::from_toml_path(path).context("load exclusions"),
        None => Ok(ExclusionList::default()),
    }
}

pub fn ingest_baby_sheets(workbook: &Path, sheets: &[String]) -> Result<Vec<SheetPair>> {
    let span = info_span!("ingest", workbook = %workbook.display());
    let _guard = span.enter();
    let start = Instant::now();
    let pairs = sheets
        .iter()
        .map(|sheet| load_sheet(workbook, sheet).with_context(|| format!("load worksheet {sheet}")))
        .collect::<Result<Vec<_>>>()?;
    info!(
        sheets = pairs.len(),
        duration_ms = start.elapsed().as_millis(),
        "ingest complete"
    );
    Ok(pairs)
}

/// Reshape, enrich, type and deduplicate the timepoint sheets.
pub fn prepare_baby_frame(
    pairs: &[SheetPair],
    mapping: &ColumnMapping,
    exclusions: &ExclusionList,
) -> Result<(DataFrame, FrameReport)> {
    let mut report = FrameReport::default();
    let mut df = info_span!("reshape").in_scope(|| {
        let start = Instant::now();
        let df = tidy_baby_sheets(pairs, mapping, &mut report).context("reshape worksheets")?;
        info!(
            rows = df.height(),
            renamed = report.renamed_columns,
            dropped = report.dropped_columns,
            duration_ms = start.elapsed().as_millis(),
            "reshape complete"
        );
        anyhow::Ok(df)
    })?;
    info_span!("derive").in_scope(|| {
        let start = Instant::now();
        let canonicalizer = Canonicalizer::baby_sheets()?;
        process_frame(
            &mut df,
            &baby_sheet_rules(),
            &canonicalizer,
            exclusions,
            &mut report,
        )
        .context("derive features")?;
        info!(
            rows = report.rows,
            columns = report.columns,
            excluded = report.excluded_rows,
            duration_ms = start.elapsed().as_millis(),
            "derive complete"
        );
        anyhow::Ok(())
    })?;
    Ok((df, report))
}

pub fn fan_out_samples(df: &DataFrame) -> Result<Vec<MemberSample>> {
    info_span!("fanout").in_scope(|| {
        let start = Instant::now();
        let samples = fan_out(df, &RoleFields::all()).context("fan out member samples")?;
        for sample in &samples {
            trace!(
                sample_id = %sample.sample_id,
                sampling_notes = redact_value(sample.sampling_notes.as_deref().unwrap_or_default()),
                "member sample"
            );
        }
        info!(
            samples = samples.len(),
            duration_ms = start.elapsed().as_millis(),
            "fanout complete"
        );
        Ok(samples)
    })
}

pub fn load_database(path: &Path, samples: &[MemberSample]) -> Result<LoadSummary> {
    info_span!("load", database = %path.display()).in_scope(|| {
        let mut loader = RelationalLoader::open(path)?;
        let summary = loader
            .load(samples)
            .with_context(|| format!("load database {}", path.display()))?;
        Ok(summary)
    })
}

/// Reshape and enrich the general worksheet.
pub fn prepare_general_frame(
    workbook: &Path,
    sheet: &str,
    mapping: &ColumnMapping,
) -> Result<(DataFrame, FrameReport)> {
    let pair = info_span!("ingest", workbook = %workbook.display())
        .in_scope(|| load_general_sheet(workbook, sheet))
        .with_context(|| format!("load worksheet {sheet}"))?;
    let mut report = FrameReport::default();
    let mut df = info_span!("reshape")
        .in_scope(|| tidy_general_sheet(&pair, mapping, &mut report))
        .context("reshape general worksheet")?;
    info_span!("derive").in_scope(|| {
        let start = Instant::now();
        let canonicalizer = Canonicalizer::general_sheet()?;
        process_frame(
            &mut df,
            &general_sheet_rules(),
            &canonicalizer,
            &ExclusionList::empty(),
            &mut report,
        )
        .context("derive general features")?;
        info!(
            rows = report.rows,
            columns = report.columns,
            duration_ms = start.elapsed().as_millis(),
            "derive complete"
        );
        anyhow::Ok(())
    })?;
    Ok((df, report))
}
