//! Days between sampling at home and arrival at the lab.

use babybiome_model::{LAB_DATE_COLUMN, MemberRole};
use chrono::NaiveDate;
use polars::prelude::DataFrame;

use super::{FeatureRule, RuleMetadata, RuleStage};
use crate::error::Result;
use crate::frame::{date_values, set_i64_column};

/// `lab - sampled` in days, `None` if either date is missing.
pub fn travel_days(lab: Option<NaiveDate>, sampled: Option<NaiveDate>) -> Option<i64> {
    Some((lab? - sampled?).num_days())
}

/// Writes `travel_time_<role>` from `probe_date_<role>` for every role.
pub struct TravelTimeRule {
    metadata: RuleMetadata,
}

impl TravelTimeRule {
    pub fn new() -> Self {
        let mut sources = vec![LAB_DATE_COLUMN.to_string()];
        sources.extend(MemberRole::ALL.iter().map(|role| role.column("probe_date")));
        let targets: Vec<String> = MemberRole::ALL
            .iter()
            .map(|role| role.column("travel_time"))
            .collect();
        Self {
            metadata: RuleMetadata::new(
                "TRAVEL_TIME",
                RuleStage::Typed,
                "Days between member sampling date and lab receipt",
            )
            .with_sources(&sources)
            .with_targets(&targets),
        }
    }
}

impl Default for TravelTimeRule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureRule for TravelTimeRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn apply(&self, df: &mut DataFrame) -> Result<()> {
        let lab = date_values(df, LAB_DATE_COLUMN, &self.metadata.id)?;
        for role in MemberRole::ALL {
            let sampled = date_values(df, &role.column("probe_date"), &self.metadata.id)?;
            let days = lab
                .iter()
                .zip(&sampled)
                .map(|(lab, sampled)| travel_days(*lab, *sampled))
                .collect();
            set_i64_column(df, &role.column("travel_time"), days)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{Column, NamedFrom, Series};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 4, day).unwrap()
    }

    #[test]
    fn difference_in_days() {
        assert_eq!(travel_days(Some(date(10)), Some(date(7))), Some(3));
        assert_eq!(travel_days(None, Some(date(7))), None);
        assert_eq!(travel_days(Some(date(10)), None), None);
    }

    #[test]
    fn named_after_sampled_member() {
        let mut columns: Vec<Column> = vec![
            Series::new(LAB_DATE_COLUMN.into(), vec![Some("2023-04-10")]).into(),
        ];
        for role in MemberRole::ALL {
            let value = (role == MemberRole::Father).then_some("2023-04-08");
            columns.push(Series::new(role.column("probe_date").as_str().into(), vec![value]).into());
        }
        let mut df = DataFrame::new(columns).unwrap();
        TravelTimeRule::new().apply(&mut df).unwrap();
        let father = df.column("travel_time_father").unwrap().i64().unwrap();
        assert_eq!(father.get(0), Some(2));
        let mother = df.column("travel_time_mother").unwrap().i64().unwrap();
        assert_eq!(mother.get(0), None);
    }
}
