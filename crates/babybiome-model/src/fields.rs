//! Per-role field schema.
//!
//! The fan-out projects one wide timepoint row into one record per family
//! member. [`RoleFields`] names, for a single role, the sheet column behind
//! every logical field of that record, so a sheet layout drift surfaces as a
//! list of missing columns instead of a failed lookup halfway through a load.

use serde::{Deserialize, Serialize};

use crate::mapping::notes_column;
use crate::role::MemberRole;

/// Date the central lab received the samples.
pub const LAB_DATE_COLUMN: &str = "probe_date_mpi";
/// Free-text remarks about the sampling of a timepoint.
pub const SAMPLING_NOTES_COLUMN: &str = "probe_abnormalities_notes";
/// Shared probiotics annotation; member and organism flags derive from it.
pub const PROBIOTICS_NOTES_COLUMN: &str = "probiotics_notes";
pub const ORAL_KIT_COLUMN: &str = "kit_oral";
pub const FAECES_KIT_COLUMN: &str = "kit_faecal";
pub const PROBIOTICS_BIFIDO_COLUMN: &str = "probiotics_bifido";
pub const PROBIOTICS_LAKT_COLUMN: &str = "probiotics_lakt";
pub const PROBIOTICS_ECOLI_COLUMN: &str = "probiotics_e_coli";
pub const PROBIOTICS_SPECIES_COLUMN: &str = "probiotics_species";
pub const FEEDING_MODE_COLUMN: &str = "feeding_mode";
pub const SPECIAL_DIET_BABY_COLUMN: &str = "special_diet_baby";

/// Diet columns for a baby. Twins share baby1's feeding columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BabyDietFields {
    pub breastfed: String,
    pub formula: String,
    pub solids: String,
    pub feeding_mode: String,
    pub special_diet: String,
    pub notes: String,
}

impl Default for BabyDietFields {
    fn default() -> Self {
        let baby1 = MemberRole::Baby1;
        Self {
            breastfed: baby1.column("breastfed"),
            formula: baby1.column("formula"),
            solids: baby1.column("solids"),
            feeding_mode: FEEDING_MODE_COLUMN.to_string(),
            special_diet: SPECIAL_DIET_BABY_COLUMN.to_string(),
            notes: notes_column(SPECIAL_DIET_BABY_COLUMN),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BabyHealthFields {
    pub weight: String,
    pub height: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotherHealthFields {
    pub weight: String,
    pub height: String,
    pub notes: String,
}

/// Source columns for one member role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFields {
    pub role: MemberRole,
    pub sample_date: String,
    pub lab_date: String,
    pub travel_time: String,
    pub oral_kit: String,
    pub faeces_kit: String,
    pub bowels: String,
    pub sampling_notes: String,
    pub antibiotics: String,
    pub antibiotics_notes: String,
    pub probiotics_taken: String,
    pub probiotics_notes: String,
    pub probiotics_bifido: String,
    pub probiotics_ecoli: String,
    pub probiotics_lakt: String,
    pub probiotics_species: String,
    pub baby_diet: Option<BabyDietFields>,
    pub baby_health: Option<BabyHealthFields>,
    pub mother_health: Option<MotherHealthFields>,
}

impl RoleFields {
    /// Default column layout of the timepoint sheets for `role`.
    pub fn for_role(role: MemberRole) -> Self {
        let antibiotics = role.column("antibiotics");
        let baby_health = role.is_baby().then(|| BabyHealthFields {
            weight: role.column("weight"),
            height: role.column("height"),
            notes: notes_column(&role.column("weight")),
        });
        let mother_health = (role == MemberRole::Mother).then(|| MotherHealthFields {
            weight: role.column("weight"),
            height: role.column("height"),
            notes: notes_column(&role.column("weight")),
        });
        Self {
            role,
            sample_date: role.column("probe_date"),
            lab_date: LAB_DATE_COLUMN.to_string(),
            travel_time: role.column("travel_time"),
            oral_kit: ORAL_KIT_COLUMN.to_string(),
            faeces_kit: FAECES_KIT_COLUMN.to_string(),
            bowels: role.column("bowels"),
            sampling_notes: SAMPLING_NOTES_COLUMN.to_string(),
            antibiotics_notes: notes_column(&antibiotics),
            antibiotics,
            probiotics_taken: role.column("probiotics"),
            probiotics_notes: PROBIOTICS_NOTES_COLUMN.to_string(),
            probiotics_bifido: PROBIOTICS_BIFIDO_COLUMN.to_string(),
            probiotics_ecoli: PROBIOTICS_ECOLI_COLUMN.to_string(),
            probiotics_lakt: PROBIOTICS_LAKT_COLUMN.to_string(),
            probiotics_species: PROBIOTICS_SPECIES_COLUMN.to_string(),
            baby_diet: role.is_baby().then(BabyDietFields::default),
            baby_health,
            mother_health,
        }
    }

    /// Layout for all six roles in fan-out order.
    pub fn all() -> Vec<RoleFields> {
        MemberRole::ALL.into_iter().map(Self::for_role).collect()
    }

    /// Columns that must be present before this role can be projected.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![
            self.sample_date.as_str(),
            self.lab_date.as_str(),
            self.travel_time.as_str(),
            self.oral_kit.as_str(),
            self.faeces_kit.as_str(),
            self.bowels.as_str(),
            self.sampling_notes.as_str(),
            self.antibiotics.as_str(),
            self.antibiotics_notes.as_str(),
            self.probiotics_taken.as_str(),
            self.probiotics_notes.as_str(),
            self.probiotics_bifido.as_str(),
            self.probiotics_ecoli.as_str(),
            self.probiotics_lakt.as_str(),
            self.probiotics_species.as_str(),
        ];
        if let Some(diet) = &self.baby_diet {
            columns.extend([
                diet.breastfed.as_str(),
                diet.formula.as_str(),
                diet.solids.as_str(),
                diet.feeding_mode.as_str(),
                diet.special_diet.as_str(),
                diet.notes.as_str(),
            ]);
        }
        if let Some(health) = &self.baby_health {
            columns.extend([
                health.weight.as_str(),
                health.height.as_str(),
                health.notes.as_str(),
            ]);
        }
        if let Some(health) = &self.mother_health {
            columns.extend([
                health.weight.as_str(),
                health.height.as_str(),
                health.notes.as_str(),
            ]);
        }
        columns
    }

    /// Required columns absent from `available`, in declaration order.
    pub fn missing_columns<S: AsRef<str>>(&self, available: &[S]) -> Vec<String> {
        self.required_columns()
            .into_iter()
            .filter(|required| !available.iter().any(|name| name.as_ref() == *required))
            .map(str::to_string)
            .collect()
    }

    /// The three answers whose joint absence means no sample was collected.
    pub fn sample_triad(&self) -> [&str; 3] {
        [
            self.antibiotics.as_str(),
            self.sample_date.as_str(),
            self.bowels.as_str(),
        ]
    }
}
