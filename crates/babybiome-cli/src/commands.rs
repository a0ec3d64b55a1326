use std::time::Instant;

use anyhow::{Result, bail};
use babybiome_cli::output::{SheetKind, write_dated_csv};
use babybiome_cli::pipeline::{
    fan_out_samples, ingest_baby_sheets, load_database, load_exclusions, load_mapping,
    prepare_baby_frame, prepare_general_frame,
};
use babybiome_cli::report::RunReport;
use babybiome_db::TABLES;
use babybiome_ingest::{GENERAL_SHEET_NAME, baby_sheet_names};
use comfy_table::Table;
use tracing::{info, info_span};

use crate::cli::{BabySheetsArgs, GeneralSheetArgs};
use crate::summary::apply_table_style;

pub fn run_tables() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Table", "Column", "Type"]);
    apply_table_style(&mut table);
    for def in TABLES {
        for (idx, column) in def.columns.iter().enumerate() {
            let name = if idx == 0 { def.name } else { "" };
            table.add_row(vec![name, column.name, column.sql_type]);
        }
    }
    println!("{table}");
    Ok(())
}

pub fn run_baby_sheets(args: &BabySheetsArgs) -> Result<RunReport> {
    let span = info_span!("baby_sheets", workbook = %args.workbook.display());
    let _guard = span.enter();
    let start = Instant::now();
    if args.last < args.first {
        bail!(
            "--last ({}) must not be smaller than --first ({})",
            args.last,
            args.first
        );
    }

    let mapping = load_mapping(&args.mapping.renames, &args.mapping.deletions)?;
    let exclusions = load_exclusions(args.exclusions.as_deref())?;
    let sheets = baby_sheet_names(args.first, args.last, &args.skip);
    if sheets.is_empty() {
        bail!("no worksheets selected");
    }
    let pairs = ingest_baby_sheets(&args.workbook, &sheets)?;
    let (mut df, frame) = prepare_baby_frame(&pairs, &mapping, &exclusions)?;

    let mut report = RunReport {
        kind: SheetKind::BabySheets.as_str().to_string(),
        workbook: args.workbook.clone(),
        sheets,
        frame,
        ..RunReport::default()
    };
    if !args.no_csv {
        report.csv = Some(write_dated_csv(&mut df, &args.output_dir, SheetKind::BabySheets)?);
    }
    if let Some(database) = &args.database {
        let samples = fan_out_samples(&df)?;
        report.samples = Some(samples.len());
        report.database = Some(load_database(database, &samples)?);
    }
    report.duration_ms = start.elapsed().as_millis();
    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    info!(duration_ms = report.duration_ms, "run complete");
    Ok(report)
}

pub fn run_general_sheet(args: &GeneralSheetArgs) -> Result<RunReport> {
    let span = info_span!("general_sheet", workbook = %args.workbook.display());
    let _guard = span.enter();
    let start = Instant::now();

    let mapping = load_mapping(&args.mapping.renames, &args.mapping.deletions)?;
    let sheet = args.sheet.as_deref().unwrap_or(GENERAL_SHEET_NAME);
    let (mut df, frame) = prepare_general_frame(&args.workbook, sheet, &mapping)?;
    let csv = write_dated_csv(&mut df, &args.output_dir, SheetKind::GeneralSheet)?;

    let mut report = RunReport {
        kind: SheetKind::GeneralSheet.as_str().to_string(),
        workbook: args.workbook.clone(),
        sheets: vec![sheet.to_string()],
        frame,
        csv: Some(csv),
        ..RunReport::default()
    };
    report.duration_ms = start.elapsed().as_millis();
    if let Some(path) = &args.report {
        report.write_json(path)?;
    }
    info!(duration_ms = report.duration_ms, "run complete");
    Ok(report)
}
