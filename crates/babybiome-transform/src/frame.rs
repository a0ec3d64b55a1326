//! DataFrame column helpers shared by the rules and the fan-out.

use babybiome_ingest::{any_to_date, any_to_string_non_empty, date_to_days};
use chrono::NaiveDate;
use polars::prelude::{
    AnyValue, BooleanChunked, Column, DataFrame, DataType, NamedFrom, NewChunkedArray, Series,
};

use crate::error::{Result, TransformError};

/// Separator of list-valued features stored as text.
pub const LIST_SEPARATOR: &str = ";";

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Look up a column, failing with the consumer named in the error.
pub fn require_column<'a>(df: &'a DataFrame, name: &str, context: &str) -> Result<&'a Column> {
    df.column(name).map_err(|_| TransformError::MissingColumn {
        column: name.to_string(),
        context: context.to_string(),
    })
}

pub fn require_columns(df: &DataFrame, names: &[&str], context: &str) -> Result<()> {
    for name in names {
        require_column(df, name, context)?;
    }
    Ok(())
}

fn column_values<T>(
    df: &DataFrame,
    name: &str,
    context: &str,
    convert: impl Fn(AnyValue<'_>) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    let column = require_column(df, name, context)?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(convert(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Non-empty text values of a column.
pub fn string_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<String>>> {
    column_values(df, name, context, any_to_string_non_empty)
}

pub fn date_values(df: &DataFrame, name: &str, context: &str) -> Result<Vec<Option<NaiveDate>>> {
    column_values(df, name, context, any_to_date)
}

pub fn set_string_column(df: &mut DataFrame, name: &str, values: Vec<Option<String>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_bool_column(df: &mut DataFrame, name: &str, values: Vec<Option<bool>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_f64_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_i64_column(df: &mut DataFrame, name: &str, values: Vec<Option<i64>>) -> Result<()> {
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

pub fn set_date_column(df: &mut DataFrame, name: &str, values: Vec<Option<NaiveDate>>) -> Result<()> {
    let days: Vec<Option<i32>> = values.into_iter().map(|d| d.map(date_to_days)).collect();
    let series = Series::new(name.into(), days).cast(&DataType::Date)?;
    df.with_column(series)?;
    Ok(())
}

pub fn filter_rows(df: &mut DataFrame, keep: &[bool]) -> Result<()> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    *df = df.filter(&mask)?;
    Ok(())
}

/// Concatenate the present parts with a space; `None` if all are missing.
pub fn join_text<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    let present: Vec<&str> = parts.into_iter().flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.join(" "))
    }
}

pub fn join_tags(tags: &[&str]) -> String {
    tags.join(LIST_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_columns_round_trip() {
        let mut df = DataFrame::new(vec![Series::new("x".into(), vec![1i64, 2]).into()]).unwrap();
        let date = NaiveDate::from_ymd_opt(2022, 2, 1).unwrap();
        set_date_column(&mut df, "d", vec![Some(date), None]).unwrap();
        assert_eq!(df.column("d").unwrap().dtype(), &DataType::Date);
        assert_eq!(date_values(&df, "d", "test").unwrap(), vec![Some(date), None]);
    }

    #[test]
    fn missing_column_names_consumer() {
        let df = DataFrame::new(vec![Series::new("x".into(), vec![1i64]).into()]).unwrap();
        let err = string_values(&df, "y", "probiotics").unwrap_err();
        assert_eq!(err.to_string(), "column 'y' required by probiotics is missing");
    }

    #[test]
    fn join_text_skips_missing() {
        assert_eq!(join_text([Some("a"), None, Some("b")]).as_deref(), Some("a b"));
        assert_eq!(join_text([None, None]), None);
    }
}
