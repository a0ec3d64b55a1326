use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use babybiome_cli::report::RunReport;

pub fn print_summary(report: &RunReport) {
    println!("Workbook: {}", report.workbook.display());
    println!("Sheets: {}", report.sheets.len());
    if let Some(path) = &report.csv {
        println!("CSV: {}", path.display());
    }

    let frame = &report.frame;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Rows", Some(frame.rows)),
        ("Columns", Some(frame.columns)),
        ("Renamed columns", Some(frame.renamed_columns)),
        ("Dropped columns", Some(frame.dropped_columns)),
        ("Text rules", Some(frame.raw_text_rules)),
        ("Canonicalized cells", Some(frame.canonicalized_cells)),
        ("Typed columns", Some(frame.typed_columns)),
        ("Typed rules", Some(frame.typed_rules)),
        ("Excluded rows", Some(frame.excluded_rows)),
        ("Member samples", report.samples),
    ];
    for (label, count) in rows {
        table.add_row(vec![Cell::new(label), count_cell(count)]);
    }
    println!("{table}");

    if let Some(summary) = &report.database {
        let mut table = Table::new();
        table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
        apply_summary_table_style(&mut table);
        align_column(&mut table, 1, CellAlignment::Right);
        let counts = [
            ("collected_samples", summary.collected_samples),
            ("antibiotics", summary.antibiotics),
            ("probiotics", summary.probiotics),
            ("baby_diet", summary.baby_diet),
            ("baby_health", summary.baby_health),
            ("mother_health", summary.mother_health),
        ];
        for (name, count) in counts {
            table.add_row(vec![Cell::new(name), count_cell(Some(count))]);
        }
        table.add_row(vec![
            Cell::new("TOTAL")
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(summary.total()).add_attribute(Attribute::Bold),
        ]);
        println!("{table}");
    }
}

fn count_cell(count: Option<usize>) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
