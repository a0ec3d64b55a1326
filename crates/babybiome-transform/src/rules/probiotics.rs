//! Probiotics intake from the shared probiotics note.
//!
//! One note per timepoint says who took probiotics and which organisms.
//! Member and organism flags are independent substring tests, so a note may
//! set any combination.

use babybiome_model::MemberRole;
use babybiome_model::fields::{
    PROBIOTICS_BIFIDO_COLUMN, PROBIOTICS_ECOLI_COLUMN, PROBIOTICS_LAKT_COLUMN,
    PROBIOTICS_NOTES_COLUMN, PROBIOTICS_SPECIES_COLUMN,
};
use polars::prelude::DataFrame;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{join_tags, set_bool_column, set_string_column, string_values};

const MEMBER_KEYWORDS: [(MemberRole, &str); 6] = [
    (MemberRole::Mother, "mutter"),
    (MemberRole::Sibling1, "kind"),
    (MemberRole::Sibling2, "child"),
    (MemberRole::Father, "vater"),
    (MemberRole::Baby1, "baby"),
    (MemberRole::Baby2, "infant"),
];

/// Flags derived from one probiotics note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProbioticsFlags {
    pub mother: bool,
    pub father: bool,
    pub sibling1: bool,
    pub sibling2: bool,
    pub baby1: bool,
    pub baby2: bool,
    pub bifido: bool,
    pub lakt: bool,
    pub ecoli: bool,
}

impl ProbioticsFlags {
    pub fn member(&self, role: MemberRole) -> bool {
        match role {
            MemberRole::Father => self.father,
            MemberRole::Mother => self.mother,
            MemberRole::Sibling1 => self.sibling1,
            MemberRole::Sibling2 => self.sibling2,
            MemberRole::Baby1 => self.baby1,
            MemberRole::Baby2 => self.baby2,
        }
    }

    fn set_member(&mut self, role: MemberRole) {
        match role {
            MemberRole::Father => self.father = true,
            MemberRole::Mother => self.mother = true,
            MemberRole::Sibling1 => self.sibling1 = true,
            MemberRole::Sibling2 => self.sibling2 = true,
            MemberRole::Baby1 => self.baby1 = true,
            MemberRole::Baby2 => self.baby2 = true,
        }
    }

    /// Organism tags in fixed order.
    pub fn species(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        if self.bifido {
            tags.push("bifido");
        }
        if self.lakt {
            tags.push("lactobacillus");
        }
        if self.ecoli {
            tags.push("e.coli");
        }
        tags
    }
}

pub fn classify_probiotics(note: &str) -> ProbioticsFlags {
    let text = note.to_lowercase();
    let mut flags = ProbioticsFlags::default();
    for (role, keyword) in MEMBER_KEYWORDS {
        if text.contains(keyword) {
            flags.set_member(role);
        }
    }
    flags.bifido = text.contains("bifido");
    flags.lakt = text.contains("lakt");
    flags.ecoli = text.contains("coli");
    flags
}

pub struct ProbioticsRule {
    metadata: RuleMetadata,
}

impl ProbioticsRule {
    pub fn new() -> Self {
        let mut targets: Vec<String> = MemberRole::ALL
            .iter()
            .map(|role| role.column("probiotics"))
            .collect();
        targets.extend(
            [
                PROBIOTICS_BIFIDO_COLUMN,
                PROBIOTICS_LAKT_COLUMN,
                PROBIOTICS_ECOLI_COLUMN,
                PROBIOTICS_SPECIES_COLUMN,
            ]
            .map(str::to_string),
        );
        Self {
            metadata: RuleMetadata::new(
                "PROBIOTICS",
                RuleStage::RawText,
                "Derive member and organism probiotics flags from the probiotics note",
            )
            .with_sources(&[PROBIOTICS_NOTES_COLUMN])
            .with_targets(&targets),
        }
    }
}

impl Default for ProbioticsRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for ProbioticsRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        let notes = string_values(df, PROBIOTICS_NOTES_COLUMN, &self.metadata.id)?;
        let flags: Vec<Option<ProbioticsFlags>> = notes
            .iter()
            .map(|note| note.as_deref().map(classify_probiotics))
            .collect();

        for role in MemberRole::ALL {
            let values = flags.iter().map(|f| f.map(|f| f.member(role))).collect();
            set_bool_column(df, &role.column("probiotics"), values)?;
        }
        let bifido = flags.iter().map(|f| f.map(|f| f.bifido)).collect();
        set_bool_column(df, PROBIOTICS_BIFIDO_COLUMN, bifido)?;
        let lakt = flags.iter().map(|f| f.map(|f| f.lakt)).collect();
        set_bool_column(df, PROBIOTICS_LAKT_COLUMN, lakt)?;
        let ecoli = flags.iter().map(|f| f.map(|f| f.ecoli)).collect();
        set_bool_column(df, PROBIOTICS_ECOLI_COLUMN, ecoli)?;
        let species = flags
            .iter()
            .map(|f| f.map(|f| join_tags(&f.species())))
            .collect();
        set_string_column(df, PROBIOTICS_SPECIES_COLUMN, species)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn test_metadata() {
        let rule = ProbioticsRule::new();
        assert_eq!(rule.metadata().id, "PROBIOTICS");
        assert_eq!(rule.metadata().stage, RuleStage::RawText);
        assert!(
            rule.metadata()
                .target_columns
                .contains(&"probiotics_sib2".to_string())
        );
    }

    #[test]
    fn flags_are_independent() {
        let flags = classify_probiotics("Mutter und Baby: Bifidobakterien + Laktobazillen");
        assert!(flags.mother && flags.baby1);
        assert!(!flags.father && !flags.sibling1);
        assert!(flags.bifido && flags.lakt && !flags.ecoli);
        assert_eq!(flags.species(), vec!["bifido", "lactobacillus"]);
    }

    #[test]
    fn null_note_gives_null_flags() {
        let mut df = DataFrame::new(vec![
            Series::new(
                PROBIOTICS_NOTES_COLUMN.into(),
                vec![Some("Vater: E. coli Nissle"), None, Some("keine")],
            )
            .into(),
        ])
        .unwrap();
        ProbioticsRule::new().apply(&mut df).unwrap();

        let father = df.column("probiotics_father").unwrap().bool().unwrap();
        assert_eq!(father.get(0), Some(true));
        assert_eq!(father.get(1), None);
        assert_eq!(father.get(2), Some(false));
        let ecoli = df.column(PROBIOTICS_ECOLI_COLUMN).unwrap().bool().unwrap();
        assert_eq!(ecoli.get(0), Some(true));
        let species = df.column(PROBIOTICS_SPECIES_COLUMN).unwrap().str().unwrap();
        assert_eq!(species.get(0), Some("e.coli"));
        assert_eq!(species.get(2), Some(""));
    }
}
