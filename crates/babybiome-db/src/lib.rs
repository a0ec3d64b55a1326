//! Relational storage of the per-member sample records.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{LoadError, Result};
pub use loader::{LoadSummary, RelationalLoader};
pub use schema::{ColumnDef, TABLES, TableDef, recreate_schema, schema_ddl};
