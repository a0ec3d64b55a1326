//! Canonical yes/no and frequency answers, followed by column typing.
//!
//! The questionnaires answer the same question as "Ja", "ja, täglich",
//! "nein" or "Nein, nie". An ordered pattern list rewrites such answers to
//! canonical tokens; afterwards every text column is typed as the narrowest
//! type all of its values parse as.

use std::collections::BTreeSet;

use babybiome_ingest::{parse_bool, parse_date, parse_f64, parse_i64};
use chrono::NaiveDate;
use polars::prelude::{DataFrame, DataType};
use regex::{NoExpand, Regex};
use tracing::debug;

use crate::error::{Result, TransformError};
use crate::frame::{
    set_bool_column, set_date_column, set_f64_column, set_i64_column, set_string_column,
    string_values,
};
use crate::shape::{FAMILY_COLUMN, TIME_POINT_COLUMN};

/// Timepoint sheets: any answer mentioning the token becomes the token.
const BABY_SHEET_PATTERNS: [(&str, &str); 5] = [
    (r".*[Jj][Aa].*", "True"),
    (r".*[Nn][Ee][Ii][Nn].*", "False"),
    (r".*[Jj]eden.*", "min. once per day"),
    (r".*[Hh]öchstens.*", "max. once per week"),
    (r".*[Mm]ehrmal.*", "several times a week"),
];

/// General sheet: only the token itself is replaced.
const GENERAL_SHEET_PATTERNS: [(&str, &str); 2] =
    [(r"[Jj][Aa]", "True"), (r"[Nn][Ee][Ii][Nn]", "False")];

/// Ordered list of literal pattern replacements over text columns.
#[derive(Debug, Clone)]
pub struct Canonicalizer {
    replacements: Vec<(Regex, String)>,
    exempt_columns: BTreeSet<String>,
}

impl Canonicalizer {
    /// Compile `patterns`; replacements are inserted literally.
    pub fn new<P: AsRef<str>, R: AsRef<str>>(patterns: &[(P, R)]) -> Result<Self> {
        let replacements = patterns
            .iter()
            .map(|(pattern, replacement)| {
                let pattern = pattern.as_ref();
                Regex::new(pattern)
                    .map(|regex| (regex, replacement.as_ref().to_string()))
                    .map_err(|source| TransformError::Pattern {
                        pattern: pattern.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            replacements,
            exempt_columns: [FAMILY_COLUMN, TIME_POINT_COLUMN]
                .map(str::to_string)
                .into_iter()
                .collect(),
        })
    }

    pub fn baby_sheets() -> Result<Self> {
        Self::new(&BABY_SHEET_PATTERNS)
    }

    pub fn general_sheet() -> Result<Self> {
        Self::new(&GENERAL_SHEET_PATTERNS)
    }

    /// Leave `column` untouched in addition to the record keys.
    pub fn with_exempt_column(mut self, column: impl Into<String>) -> Self {
        self.exempt_columns.insert(column.into());
        self
    }

    pub fn canonicalize_value(&self, value: &str) -> String {
        let mut value = value.to_string();
        for (regex, replacement) in &self.replacements {
            if regex.is_match(&value) {
                value = regex
                    .replace_all(&value, NoExpand(replacement))
                    .into_owned();
            }
        }
        value
    }

    /// Rewrite every text column except the exempt ones. Empty strings are
    /// kept as they are. Returns the number of cells that changed.
    pub fn apply(&self, df: &mut DataFrame) -> Result<usize> {
        let targets: Vec<String> = df
            .get_columns()
            .iter()
            .filter(|column| column.dtype() == &DataType::String)
            .map(|column| column.name().to_string())
            .filter(|name| !self.exempt_columns.contains(name))
            .collect();
        let mut changed = 0;
        for name in &targets {
            let values: Vec<Option<String>> = df
                .column(name)?
                .str()?
                .into_iter()
                .map(|value| value.map(str::to_string))
                .collect();
            let rewritten: Vec<Option<String>> = values
                .iter()
                .map(|value| value.as_deref().map(|value| self.canonicalize_value(value)))
                .collect();
            changed += values
                .iter()
                .zip(&rewritten)
                .filter(|(before, after)| before != after)
                .count();
            set_string_column(df, name, rewritten)?;
        }
        debug!(columns = targets.len(), changed, "canonicalized answers");
        Ok(changed)
    }
}

/// Narrowest type every non-null value of a text column parses as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferredType {
    Boolean,
    Integer,
    Float,
    Date,
    Text,
}

pub fn infer_type<'a>(values: impl IntoIterator<Item = &'a str>) -> InferredType {
    let values: Vec<&str> = values.into_iter().collect();
    if values.is_empty() {
        InferredType::Text
    } else if values.iter().all(|value| parse_bool(value).is_some()) {
        InferredType::Boolean
    } else if values.iter().all(|value| parse_i64(value).is_some()) {
        InferredType::Integer
    } else if values.iter().all(|value| parse_f64(value).is_some()) {
        InferredType::Float
    } else if values.iter().all(|value| parse_date(value).is_some()) {
        InferredType::Date
    } else {
        InferredType::Text
    }
}

/// Cast each text column to its inferred type. Columns that are already
/// typed, entirely null, or mixed stay as they are. Returns how many columns
/// were cast.
pub fn infer_types(df: &mut DataFrame) -> Result<usize> {
    let candidates: Vec<String> = df
        .get_columns()
        .iter()
        .filter(|column| column.dtype() == &DataType::String)
        .map(|column| column.name().to_string())
        .collect();
    let mut cast = 0;
    for name in &candidates {
        let values = string_values(df, name, "type inference")?;
        let inferred = infer_type(values.iter().flatten().map(String::as_str));
        match inferred {
            InferredType::Boolean => {
                let parsed = parse_all(&values, parse_bool);
                set_bool_column(df, name, parsed)?;
            }
            InferredType::Integer => {
                let parsed = parse_all(&values, parse_i64);
                set_i64_column(df, name, parsed)?;
            }
            InferredType::Float => {
                let parsed = parse_all(&values, parse_f64);
                set_f64_column(df, name, parsed)?;
            }
            InferredType::Date => {
                let parsed: Vec<Option<NaiveDate>> = parse_all(&values, parse_date);
                set_date_column(df, name, parsed)?;
            }
            InferredType::Text => continue,
        }
        debug!(column = %name, ?inferred, "typed column");
        cast += 1;
    }
    Ok(cast)
}

fn parse_all<T>(values: &[Option<String>], parse: impl Fn(&str) -> Option<T>) -> Vec<Option<T>> {
    values
        .iter()
        .map(|value| value.as_deref().and_then(&parse))
        .collect()
}
