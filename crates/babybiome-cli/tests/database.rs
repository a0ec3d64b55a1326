//! Timepoint workbook through the pipeline stages into DuckDB.

use std::path::{Path, PathBuf};

use babybiome_cli::pipeline::{
    fan_out_samples, ingest_baby_sheets, load_database, prepare_baby_frame,
};
use babybiome_db::{LoadError, RelationalLoader, TABLES};
use babybiome_model::{ColumnMapping, ExclusionList};
use babybiome_transform::MemberSample;
use rust_xlsxwriter::{Note, Workbook};
use tempfile::TempDir;

type Question<'a> = (&'a str, [Option<&'a str>; 2]);

const TIME_POINTS: [&str; 2] = ["Fragebogen 9Monate Ver2", "Fragebogen 12Monate wiederholt"];

/// Father and sibling2 only took part at 9Monate, sibling1 never did.
const QUESTIONS: &[Question<'static>] = &[
    ("probe_date_mpi", [Some("2023-04-10"), Some("2023-10-10")]),
    ("kit_oral", [Some("012"), Some("013")]),
    ("kit_faecal", [Some("22"), Some("23")]),
    ("probe_abnormalities", [None, None]),
    ("probiotics", [None, None]),
    ("probe_date_father", [Some("2023-04-08"), None]),
    ("antibiotics_father", [Some("nein"), None]),
    ("bowels_father", [Some("jeden Tag"), None]),
    ("probe_date_mother", [Some("2023-04-07"), Some("2023-10-08")]),
    ("antibiotics_mother", [Some("ja"), Some("Nein")]),
    ("bowels_mother", [Some("mehrmals"), Some("höchstens einmal")]),
    ("probe_date_sib1", [None, None]),
    ("antibiotics_sib1", [None, None]),
    ("bowels_sib1", [None, None]),
    ("probe_date_sib2", [None, None]),
    ("antibiotics_sib2", [Some("nein"), None]),
    ("bowels_sib2", [None, None]),
    ("probe_date_baby1", [Some("2023-04-09"), Some("2023-10-09")]),
    ("antibiotics_baby1", [Some("nein"), Some("nein")]),
    ("bowels_baby1", [Some("jeden Tag"), Some("jeden Tag")]),
    ("probe_date_baby2", [Some("2023-04-09"), None]),
    ("antibiotics_baby2", [None, None]),
    ("bowels_baby2", [None, None]),
    (
        "food_baby1",
        [Some("Das Kind wurde gestillt und bekam Beikost"), Some("Brei")],
    ),
    ("food_baby2", [None, None]),
    ("diet_baby", [None, Some("vegetarisch")]),
    ("weight_baby1", [Some("7.5"), Some("9.1")]),
    ("height_baby1", [Some("68"), Some("74.5")]),
    ("weight_baby2", [Some("7.2"), None]),
    ("height_baby2", [Some("67"), None]),
    ("weight_mother", [Some("62"), Some("61.5")]),
    ("height_mother", [Some("168"), Some("168")]),
];

fn create_timepoint_workbook(dir: &Path, families: &[&str]) -> PathBuf {
    let mut workbook = Workbook::new();
    for family in families {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*family).unwrap();
        worksheet.write_string(0, 1, "Zeitpunkt").unwrap();
        for (offset, title) in TIME_POINTS.iter().enumerate() {
            worksheet.write_string(0, 2 + offset as u16, *title).unwrap();
        }
        for (index, (label, answers)) in QUESTIONS.iter().enumerate() {
            let row = index as u32 + 1;
            worksheet.write_string(row, 1, *label).unwrap();
            for (offset, answer) in answers.iter().enumerate() {
                if let Some(answer) = answer {
                    worksheet.write_string(row, 2 + offset as u16, *answer).unwrap();
                }
            }
            if *label == "probiotics" {
                worksheet
                    .insert_note(row, 2, &Note::new("Mutter und Baby: Bifidobakterien"))
                    .unwrap();
            }
        }
    }
    let path = dir.join("babies.xlsx");
    workbook.save(&path).unwrap();
    path
}

fn run_pipeline(workbook: &Path, families: &[&str]) -> Vec<MemberSample> {
    let sheets: Vec<String> = families.iter().map(|family| (*family).to_string()).collect();
    let pairs = ingest_baby_sheets(workbook, &sheets).unwrap();
    let (df, report) =
        prepare_baby_frame(&pairs, &ColumnMapping::default(), &ExclusionList::default()).unwrap();
    assert_eq!(report.rows, 2 * families.len());
    fan_out_samples(&df).unwrap()
}

fn query_i64(loader: &RelationalLoader, sql: &str) -> i64 {
    loader
        .connection()
        .query_row(sql, [], |row| row.get::<_, i64>(0))
        .unwrap()
}

fn query_text(loader: &RelationalLoader, sql: &str) -> Option<String> {
    loader
        .connection()
        .query_row(sql, [], |row| row.get::<_, Option<String>>(0))
        .unwrap()
}

#[test]
fn workbook_loads_into_linked_tables() {
    let dir = TempDir::new().unwrap();
    let families = ["B002", "B003"];
    let workbook = create_timepoint_workbook(dir.path(), &families);
    let samples = run_pipeline(&workbook, &families);
    assert_eq!(samples.len(), 16);

    let database = dir.path().join("babybiome.duckdb");
    let summary = load_database(&database, &samples).unwrap();
    assert_eq!(summary.collected_samples, 16);
    assert_eq!(summary.antibiotics, 16);
    assert_eq!(summary.probiotics, 16);
    assert_eq!(summary.baby_diet, 8);
    assert_eq!(summary.baby_health, 8);
    assert_eq!(summary.mother_health, 4);

    let loader = RelationalLoader::open(&database).unwrap();
    let counts = loader.table_counts().unwrap();
    assert_eq!(counts[0], ("collected_samples", 16));
    for table in TABLES.iter().skip(1) {
        let orphans = query_i64(
            &loader,
            &format!(
                "SELECT count(*) FROM \"{}\" s LEFT JOIN collected_samples c \
                 ON s.sample_id = c.sample_id WHERE c.sample_id IS NULL",
                table.name
            ),
        );
        assert_eq!(orphans, 0, "orphan rows in {}", table.name);
    }
    let sibling1 = query_i64(
        &loader,
        "SELECT count(*) FROM collected_samples WHERE member = 'S'",
    );
    assert_eq!(sibling1, 0);

    assert_eq!(
        query_text(
            &loader,
            "SELECT oral_kit FROM collected_samples WHERE sample_id = 'B002-M-9Monate'",
        )
        .as_deref(),
        Some("012")
    );
    assert_eq!(
        query_text(
            &loader,
            "SELECT d.feeding_mode FROM baby_diet d JOIN collected_samples c \
             ON d.sample_id = c.sample_id WHERE c.sample_id = 'B003-B-9Monate'",
        )
        .as_deref(),
        Some("breastfed;solids")
    );
    let mother_probiotics = query_i64(
        &loader,
        "SELECT count(*) FROM probiotics p JOIN collected_samples c \
         ON p.sample_id = c.sample_id WHERE c.member = 'M' AND p.taken AND p.bifido",
    );
    assert_eq!(mother_probiotics, 2);
}

#[test]
fn failed_load_keeps_previous_tables() {
    let dir = TempDir::new().unwrap();
    let workbook = create_timepoint_workbook(dir.path(), &["B002", "B003"]);
    let database = dir.path().join("babybiome.duckdb");
    let first = run_pipeline(&workbook, &["B002"]);
    load_database(&database, &first).unwrap();

    let mut second = run_pipeline(&workbook, &["B002", "B003"]);
    let repeated = second[0].clone();
    second.push(repeated);
    let err = load_database(&database, &second).unwrap_err();
    assert!(
        matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::Insert { table: "collected_samples", .. })
        ),
        "{err:#}"
    );

    let loader = RelationalLoader::open(&database).unwrap();
    let counts = loader.table_counts().unwrap();
    assert_eq!(counts[0], ("collected_samples", first.len()));
    assert_eq!(counts[5], ("mother_health", 2));
    let later_family = query_i64(
        &loader,
        "SELECT count(*) FROM collected_samples WHERE family = 'B003'",
    );
    assert_eq!(later_family, 0);
}
