//! Projection of timepoint rows into per-member sample records.
//!
//! A timepoint row holds the answers of the whole family. Each role's
//! [`RoleFields`] names the columns that make up that member's record and
//! its satellite rows. Adults and siblings who did not give a sample that
//! timepoint leave antibiotics, sampling date and bowel movements blank and
//! get no record; babies always get one.

use babybiome_ingest::{any_to_bool, any_to_date, any_to_f64, any_to_i64, any_to_string_non_empty};
use babybiome_model::{BabyDietFields, MemberRole, RoleFields};
use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame};
use tracing::{debug, info};

use crate::error::{Result, TransformError};
use crate::frame::require_column;
use crate::shape::{FAMILY_COLUMN, TIME_POINT_COLUMN};

const CONTEXT: &str = "fan-out";

#[derive(Debug, Clone, PartialEq)]
pub struct AntibioticsRecord {
    pub taken: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbioticsRecord {
    pub taken: Option<bool>,
    pub bifido: Option<bool>,
    pub ecoli: Option<bool>,
    pub lakt: Option<bool>,
    pub species: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BabyDietRecord {
    pub breastfed: Option<bool>,
    pub formula: Option<bool>,
    pub solids: Option<bool>,
    pub feeding_mode: Option<String>,
    pub special_diet: Option<String>,
    pub notes: Option<String>,
}

/// Weight, height and remarks; shared by the baby and mother health tables.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub notes: Option<String>,
}

/// One member's sample at one timepoint, with its satellite rows.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSample {
    pub sample_id: String,
    pub family: String,
    pub time_point: String,
    pub role: MemberRole,
    pub sampling_date: Option<NaiveDate>,
    pub frozen_date: Option<NaiveDate>,
    pub travel_time: Option<i64>,
    pub oral_kit: Option<String>,
    pub faeces_kit: Option<String>,
    pub bowel_movements: Option<String>,
    pub sampling_notes: Option<String>,
    pub antibiotics: AntibioticsRecord,
    pub probiotics: ProbioticsRecord,
    pub baby_diet: Option<BabyDietRecord>,
    pub baby_health: Option<HealthRecord>,
    pub mother_health: Option<HealthRecord>,
}

/// Typed access to one row of a validated frame.
struct RowReader<'a> {
    df: &'a DataFrame,
    row: usize,
}

impl RowReader<'_> {
    fn value(&self, column: &str) -> Result<AnyValue<'_>> {
        let column = require_column(self.df, column, CONTEXT)?;
        Ok(column.get(self.row).unwrap_or(AnyValue::Null))
    }

    fn text(&self, column: &str) -> Result<Option<String>> {
        Ok(any_to_string_non_empty(self.value(column)?))
    }

    fn boolean(&self, column: &str) -> Result<Option<bool>> {
        Ok(any_to_bool(self.value(column)?))
    }

    fn float(&self, column: &str) -> Result<Option<f64>> {
        Ok(any_to_f64(self.value(column)?))
    }

    fn integer(&self, column: &str) -> Result<Option<i64>> {
        Ok(any_to_i64(self.value(column)?))
    }

    fn date(&self, column: &str) -> Result<Option<NaiveDate>> {
        Ok(any_to_date(self.value(column)?))
    }

    fn is_null(&self, column: &str) -> Result<bool> {
        Ok(self.text(column)?.is_none())
    }

    fn key(&self, column: &str) -> Result<String> {
        self.text(column)?.ok_or_else(|| TransformError::MissingKey {
            column: column.to_string(),
            row: self.row,
        })
    }
}

/// Check that every role's columns exist before projecting any row.
pub fn validate_roles(df: &DataFrame, roles: &[RoleFields]) -> Result<()> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    for fields in roles {
        let missing = fields.missing_columns(&available);
        if !missing.is_empty() {
            return Err(TransformError::MissingRoleColumns {
                role: fields.role,
                columns: missing,
            });
        }
    }
    require_column(df, FAMILY_COLUMN, CONTEXT)?;
    require_column(df, TIME_POINT_COLUMN, CONTEXT)?;
    Ok(())
}

/// Project every row of `df` into member samples, role by role in the
/// order of `roles`.
pub fn fan_out(df: &DataFrame, roles: &[RoleFields]) -> Result<Vec<MemberSample>> {
    validate_roles(df, roles)?;
    let mut samples = Vec::with_capacity(df.height() * roles.len());
    for fields in roles {
        let mut skipped = 0usize;
        for row in 0..df.height() {
            let reader = RowReader { df, row };
            match project_row(&reader, fields)? {
                Some(sample) => samples.push(sample),
                None => skipped += 1,
            }
        }
        debug!(role = %fields.role, skipped, "projected role");
    }
    info!(rows = df.height(), samples = samples.len(), "fanned out member samples");
    Ok(samples)
}

fn project_row(reader: &RowReader<'_>, fields: &RoleFields) -> Result<Option<MemberSample>> {
    if !fields.role.is_baby() {
        let mut no_sample = true;
        for column in fields.sample_triad() {
            no_sample &= reader.is_null(column)?;
        }
        if no_sample {
            return Ok(None);
        }
    }

    let family = reader.key(FAMILY_COLUMN)?;
    let time_point = reader.key(TIME_POINT_COLUMN)?;
    let baby_diet = fields
        .baby_diet
        .as_ref()
        .map(|diet| read_baby_diet(reader, diet))
        .transpose()?;
    let baby_health = fields
        .baby_health
        .as_ref()
        .map(|health| read_health(reader, &health.weight, &health.height, &health.notes))
        .transpose()?;
    let mother_health = fields
        .mother_health
        .as_ref()
        .map(|health| read_health(reader, &health.weight, &health.height, &health.notes))
        .transpose()?;

    Ok(Some(MemberSample {
        sample_id: fields.role.sample_id(&family, &time_point),
        role: fields.role,
        sampling_date: reader.date(&fields.sample_date)?,
        frozen_date: reader.date(&fields.lab_date)?,
        travel_time: reader.integer(&fields.travel_time)?,
        oral_kit: reader.text(&fields.oral_kit)?,
        faeces_kit: reader.text(&fields.faeces_kit)?,
        bowel_movements: reader.text(&fields.bowels)?,
        sampling_notes: reader.text(&fields.sampling_notes)?,
        antibiotics: AntibioticsRecord {
            taken: reader.boolean(&fields.antibiotics)?,
            notes: reader.text(&fields.antibiotics_notes)?,
        },
        probiotics: ProbioticsRecord {
            taken: reader.boolean(&fields.probiotics_taken)?,
            bifido: reader.boolean(&fields.probiotics_bifido)?,
            ecoli: reader.boolean(&fields.probiotics_ecoli)?,
            lakt: reader.boolean(&fields.probiotics_lakt)?,
            species: reader.text(&fields.probiotics_species)?,
            notes: reader.text(&fields.probiotics_notes)?,
        },
        baby_diet,
        baby_health,
        mother_health,
        family,
        time_point,
    }))
}

fn read_baby_diet(reader: &RowReader<'_>, diet: &BabyDietFields) -> Result<BabyDietRecord> {
    Ok(BabyDietRecord {
        breastfed: reader.boolean(&diet.breastfed)?,
        formula: reader.boolean(&diet.formula)?,
        solids: reader.boolean(&diet.solids)?,
        feeding_mode: Some(reader.text(&diet.feeding_mode)?.unwrap_or_default()),
        special_diet: Some(reader.text(&diet.special_diet)?.unwrap_or_default()),
        notes: reader.text(&diet.notes)?,
    })
}

fn read_health(
    reader: &RowReader<'_>,
    weight: &str,
    height: &str,
    notes: &str,
) -> Result<HealthRecord> {
    Ok(HealthRecord {
        weight: reader.float(weight)?,
        height: reader.float(height)?,
        notes: reader.text(notes)?,
    })
}
