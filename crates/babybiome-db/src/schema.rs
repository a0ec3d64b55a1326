//! Relational schema of the sample tables.
//!
//! `collected_samples` holds one row per member sample. Every other table is
//! a 1:1 extension keyed by the same `sample_id`.

use duckdb::Connection;
use serde::Serialize;
use tracing::debug;

use crate::error::{LoadError, Result};

pub const COLLECTED_SAMPLES: &str = "collected_samples";
pub const ANTIBIOTICS: &str = "antibiotics";
pub const PROBIOTICS: &str = "probiotics";
pub const BABY_DIET: &str = "baby_diet";
pub const BABY_HEALTH: &str = "baby_health";
pub const MOTHER_HEALTH: &str = "mother_health";

const SATELLITE_KEY: &str = "varchar REFERENCES collected_samples(sample_id) UNIQUE NOT NULL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
}

const fn column(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef { name, sql_type }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
}

impl TableDef {
    pub fn create_statement(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("    \"{}\" {}", column.name, column.sql_type))
            .collect();
        format!("CREATE TABLE \"{}\" (\n{}\n);", self.name, columns.join(",\n"))
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS \"{}\";", self.name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }

    /// `INSERT` with one positional parameter per column. Date columns take
    /// ISO text and are cast on the way in.
    pub fn insert_statement(&self) -> String {
        let placeholders: Vec<&str> = self
            .columns
            .iter()
            .map(|column| {
                if column.sql_type == "date" {
                    "CAST(? AS DATE)"
                } else {
                    "?"
                }
            })
            .collect();
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.name,
            self.column_names().join(", "),
            placeholders.join(", ")
        )
    }
}

pub const COLLECTED_SAMPLES_TABLE: TableDef = TableDef {
    name: COLLECTED_SAMPLES,
    columns: &[
        column("sample_id", "varchar PRIMARY KEY"),
        column("family", "varchar(4)"),
        column("time_point", "varchar"),
        column("member", "varchar"),
        column("sampling_date", "date"),
        column("frozen_date", "date"),
        column("travel_time", "int"),
        column("oral_kit", "varchar"),
        column("faeces_kit", "varchar"),
        column("bowel_movements", "varchar"),
        column("sampling_notes", "text"),
    ],
};

pub const ANTIBIOTICS_TABLE: TableDef = TableDef {
    name: ANTIBIOTICS,
    columns: &[
        column("sample_id", SATELLITE_KEY),
        column("taken", "bool"),
        column("notes", "text"),
    ],
};

pub const PROBIOTICS_TABLE: TableDef = TableDef {
    name: PROBIOTICS,
    columns: &[
        column("sample_id", SATELLITE_KEY),
        column("taken", "bool"),
        column("bifido", "bool"),
        column("ecoli", "bool"),
        column("lakt", "bool"),
        column("species", "varchar"),
        column("notes", "text"),
    ],
};

pub const BABY_DIET_TABLE: TableDef = TableDef {
    name: BABY_DIET,
    columns: &[
        column("sample_id", SATELLITE_KEY),
        column("breastfed", "bool"),
        column("formula", "bool"),
        column("solids", "bool"),
        column("feeding_mode", "varchar"),
        column("special_diet", "varchar"),
        column("notes", "text"),
    ],
};

pub const BABY_HEALTH_TABLE: TableDef = TableDef {
    name: BABY_HEALTH,
    columns: &[
        column("sample_id", SATELLITE_KEY),
        column("weight", "double"),
        column("height", "double"),
        column("notes", "text"),
    ],
};

pub const MOTHER_HEALTH_TABLE: TableDef = TableDef {
    name: MOTHER_HEALTH,
    columns: &[
        column("sample_id", SATELLITE_KEY),
        column("weight", "double"),
        column("height", "double"),
        column("notes", "text"),
    ],
};

/// All tables, parent first.
pub const TABLES: [TableDef; 6] = [
    COLLECTED_SAMPLES_TABLE,
    ANTIBIOTICS_TABLE,
    PROBIOTICS_TABLE,
    BABY_DIET_TABLE,
    BABY_HEALTH_TABLE,
    MOTHER_HEALTH_TABLE,
];

/// Drop satellites before the parent they reference, then recreate all
/// tables parent first.
pub fn recreate_schema(conn: &Connection) -> Result<()> {
    for table in TABLES.iter().rev() {
        conn.execute_batch(&table.drop_statement())
            .map_err(|source| LoadError::Schema {
                action: "drop",
                table: table.name,
                source,
            })?;
    }
    for table in &TABLES {
        conn.execute_batch(&table.create_statement())
            .map_err(|source| LoadError::Schema {
                action: "create",
                table: table.name,
                source,
            })?;
    }
    debug!(tables = TABLES.len(), "recreated schema");
    Ok(())
}

/// `CREATE TABLE` statements for all tables, in creation order.
pub fn schema_ddl() -> String {
    TABLES
        .iter()
        .map(TableDef::create_statement)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn satellites_reference_parent() {
        for table in &TABLES[1..] {
            assert_eq!(table.columns[0].name, "sample_id");
            assert!(table.columns[0].sql_type.contains("REFERENCES collected_samples"));
        }
    }

    #[test]
    fn insert_casts_dates() {
        let insert = COLLECTED_SAMPLES_TABLE.insert_statement();
        assert!(insert.starts_with("INSERT INTO \"collected_samples\" (sample_id, family,"));
        assert_eq!(insert.matches("CAST(? AS DATE)").count(), 2);
        assert_eq!(insert.matches('?').count(), 11);
    }
}
