//! Machine-readable run report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use babybiome_db::LoadSummary;
use babybiome_transform::FrameReport;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub kind: String,
    pub workbook: PathBuf,
    pub sheets: Vec<String>,
    pub frame: FrameReport,
    /// Member samples after fan-out; timepoint sheets only.
    pub samples: Option<usize>,
    pub database: Option<LoadSummary>,
    pub csv: Option<PathBuf>,
    pub duration_ms: u128,
}

impl RunReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serialize run report")?;
        fs::write(path, json).with_context(|| format!("write report {}", path.display()))
    }
}
