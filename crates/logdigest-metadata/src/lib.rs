//! The Samples sheet, read from a CSV or TSV export.
//!
//! Only the columns the digest needs are deserialized: `Donor ID`,
//! `Sample_ID` and the three `<TYPE> lib` columns. Library cells hold a
//! comma-separated list and may be empty.

use anyhow::{Context, Result};
use logdigest_error::metadata_error;
use logdigest_ports::{MetadataSource, SampleRecord};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Donor ID")]
    donor_id: String,
    #[serde(rename = "Sample_ID")]
    sample_id: String,
    #[serde(rename = "GEX lib", default)]
    gex_lib: Option<String>,
    #[serde(rename = "BCR lib", default)]
    bcr_lib: Option<String>,
    #[serde(rename = "TCR lib", default)]
    tcr_lib: Option<String>,
}

impl From<SheetRow> for SampleRecord {
    fn from(row: SheetRow) -> Self {
        let libs = |cell: Option<String>| cell.as_deref().map(split_libraries).unwrap_or_default();
        SampleRecord {
            sample_id: row.sample_id,
            donor_id: row.donor_id,
            gex_libs: libs(row.gex_lib),
            bcr_libs: libs(row.bcr_lib),
            tcr_libs: libs(row.tcr_lib),
        }
    }
}

/// Library ids listed in one sheet cell.
pub fn split_libraries(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every row of the sheet, in sheet order.
#[derive(Clone, Debug, Default)]
pub struct SamplesSheet {
    rows: Vec<SampleRecord>,
}

impl SamplesSheet {
    /// Load an export; `.tsv` files are tab separated, anything else is CSV.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(metadata_error("samples sheet not found")
                .with_context("path", path.display().to_string())
                .into());
        }
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };
        let file = std::fs::File::open(path).with_context(|| format!("open {path:?}"))?;
        Self::from_reader(file, delimiter).with_context(|| format!("read samples sheet {path:?}"))
    }

    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let mut rows = Vec::new();
        for (i, row) in rdr.deserialize::<SheetRow>().enumerate() {
            let row = row.with_context(|| format!("samples sheet row {}", i + 1))?;
            rows.push(row.into());
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[SampleRecord] {
        &self.rows
    }
}

impl MetadataSource for SamplesSheet {
    fn samples_for_donor(&self, donor_id: &str) -> Result<Vec<SampleRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.donor_id == donor_id)
            .cloned()
            .collect())
    }
}
