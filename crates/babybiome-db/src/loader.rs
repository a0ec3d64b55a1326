//! Full-refresh load of member samples into DuckDB.

use std::path::Path;
use std::time::Instant;

use babybiome_transform::{HealthRecord, MemberSample};
use chrono::NaiveDate;
use duckdb::{Connection, Transaction, params};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{LoadError, Result};
use crate::schema::{
    ANTIBIOTICS_TABLE, BABY_DIET_TABLE, BABY_HEALTH_TABLE, COLLECTED_SAMPLES_TABLE,
    MOTHER_HEALTH_TABLE, PROBIOTICS_TABLE, TABLES, TableDef, recreate_schema,
};

/// Rows written per table by one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub collected_samples: usize,
    pub antibiotics: usize,
    pub probiotics: usize,
    pub baby_diet: usize,
    pub baby_health: usize,
    pub mother_health: usize,
}

impl LoadSummary {
    pub fn total(&self) -> usize {
        self.collected_samples
            + self.antibiotics
            + self.probiotics
            + self.baby_diet
            + self.baby_health
            + self.mother_health
    }
}

pub struct RelationalLoader {
    conn: Connection,
}

impl RelationalLoader {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "opened database");
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Replace the database content with `samples`. Runs in one transaction:
    /// on any failure, including a constraint violation, the previous
    /// content stays in place.
    pub fn load(&mut self, samples: &[MemberSample]) -> Result<LoadSummary> {
        let start = Instant::now();
        let tx = self.conn.transaction()?;
        recreate_schema(&tx)?;
        let mut summary = LoadSummary::default();
        for sample in samples {
            insert_sample(&tx, sample, &mut summary)?;
        }
        tx.commit()?;
        info!(
            samples = summary.collected_samples,
            rows = summary.total(),
            duration_ms = start.elapsed().as_millis(),
            "loaded database"
        );
        Ok(summary)
    }

    /// Current row count of every table, in creation order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, usize)>> {
        TABLES
            .iter()
            .map(|table| {
                let count: i64 = self.conn.query_row(
                    &format!("SELECT count(*) FROM \"{}\"", table.name),
                    [],
                    |row| row.get(0),
                )?;
                Ok((table.name, usize::try_from(count).unwrap_or_default()))
            })
            .collect()
    }
}

fn iso_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|date| date.format("%Y-%m-%d").to_string())
}

fn insert_error(table: &TableDef, sample: &MemberSample) -> impl FnOnce(duckdb::Error) -> LoadError {
    let table = table.name;
    let sample_id = sample.sample_id.clone();
    move |source| LoadError::Insert {
        table,
        sample_id,
        source,
    }
}

/// Insert the parent row, then its satellites.
fn insert_sample(tx: &Transaction<'_>, sample: &MemberSample, summary: &mut LoadSummary) -> Result<()> {
    let id = sample.sample_id.as_str();
    tx.execute(
        &COLLECTED_SAMPLES_TABLE.insert_statement(),
        params![
            id,
            sample.family,
            sample.time_point,
            sample.role.code(),
            iso_date(sample.sampling_date),
            iso_date(sample.frozen_date),
            sample.travel_time,
            sample.oral_kit,
            sample.faeces_kit,
            sample.bowel_movements,
            sample.sampling_notes,
        ],
    )
    .map_err(insert_error(&COLLECTED_SAMPLES_TABLE, sample))?;
    summary.collected_samples += 1;

    let antibiotics = &sample.antibiotics;
    tx.execute(
        &ANTIBIOTICS_TABLE.insert_statement(),
        params![id, antibiotics.taken, antibiotics.notes],
    )
    .map_err(insert_error(&ANTIBIOTICS_TABLE, sample))?;
    summary.antibiotics += 1;

    let probiotics = &sample.probiotics;
    tx.execute(
        &PROBIOTICS_TABLE.insert_statement(),
        params![
            id,
            probiotics.taken,
            probiotics.bifido,
            probiotics.ecoli,
            probiotics.lakt,
            probiotics.species,
            probiotics.notes,
        ],
    )
    .map_err(insert_error(&PROBIOTICS_TABLE, sample))?;
    summary.probiotics += 1;

    if let Some(diet) = &sample.baby_diet {
        tx.execute(
            &BABY_DIET_TABLE.insert_statement(),
            params![
                id,
                diet.breastfed,
                diet.formula,
                diet.solids,
                diet.feeding_mode,
                diet.special_diet,
                diet.notes,
            ],
        )
        .map_err(insert_error(&BABY_DIET_TABLE, sample))?;
        summary.baby_diet += 1;
    }
    if let Some(health) = &sample.baby_health {
        insert_health(tx, &BABY_HEALTH_TABLE, sample, health)?;
        summary.baby_health += 1;
    }
    if let Some(health) = &sample.mother_health {
        insert_health(tx, &MOTHER_HEALTH_TABLE, sample, health)?;
        summary.mother_health += 1;
    }
    debug!(sample_id = id, "inserted sample");
    Ok(())
}

fn insert_health(
    tx: &Transaction<'_>,
    table: &TableDef,
    sample: &MemberSample,
    health: &HealthRecord,
) -> Result<()> {
    tx.execute(
        &table.insert_statement(),
        params![sample.sample_id, health.weight, health.height, health.notes],
    )
    .map_err(insert_error(table, sample))?;
    Ok(())
}
