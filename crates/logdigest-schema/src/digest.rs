use serde::{Serialize, Serializer};

pub const SAMPLE_ID: &str = "Sample ID";
pub const CELL_COUNT: &str = "# Cells";
pub const FAILED: &str = "Failed?";
pub const WARNING: &str = "Warning?";
pub const FAILURE_REASON: &str = "Failure Reason";
pub const WARNING_REASON: &str = "Warning Reason";
pub const DOUBLETS: &str = "% doublets";
pub const AMBIENT_RNA: &str = "% ambient RNA";
pub const VDJ: &str = "% vdj genes";
pub const RBC: &str = "% RBC";
pub const LAST_PROCESSED: &str = "Last Processed";

/// Column order of the sample digest CSV.
pub const SAMPLE_DIGEST_HEADERS: [&str; 11] = [
    SAMPLE_ID,
    CELL_COUNT,
    FAILED,
    WARNING,
    FAILURE_REASON,
    WARNING_REASON,
    DOUBLETS,
    AMBIENT_RNA,
    VDJ,
    RBC,
    LAST_PROCESSED,
];

pub const LIB_ID: &str = "lib_id";
pub const CELLS_BEFORE_QC: &str = "# Cells Before QC";
pub const CELLS_AFTER_QC: &str = "# Cells After QC";
pub const CORRESPONDING_GEX_LIB: &str = "corresponding_gex_lib";
pub const DONOR_ID: &str = "donor_id";
pub const LIB_TYPE: &str = "lib_type";

/// Column order of the library metrics CSV.
pub const LIBRARY_METRICS_HEADERS: [&str; 6] = [
    LIB_ID,
    CELLS_BEFORE_QC,
    CELLS_AFTER_QC,
    CORRESPONDING_GEX_LIB,
    DONOR_ID,
    LIB_TYPE,
];

/// Separator between accumulated failure/warning reasons.
pub const REASON_SEPARATOR: &str = " --- ";

/// Percentages never seen in a log stay at this value.
pub const UNSEEN_PERCENT: &str = "-1";

/// Placeholder for library fields the log never mentioned.
pub const UNKNOWN_FIELD: &str = "?";

fn yes_no<S: Serializer>(flag: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(if *flag { "Yes" } else { "No" })
}

/// One row of the sample digest.
///
/// Values extracted from logs are kept as the text the log carried; the
/// digest never reformats numbers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SampleDigestRow {
    #[serde(rename = "Sample ID")]
    pub sample_id: String,
    #[serde(rename = "# Cells")]
    pub cell_count: String,
    #[serde(rename = "Failed?", serialize_with = "yes_no")]
    pub failed: bool,
    #[serde(rename = "Warning?", serialize_with = "yes_no")]
    pub warning: bool,
    #[serde(rename = "Failure Reason")]
    pub failure_reason: String,
    #[serde(rename = "Warning Reason")]
    pub warning_reason: String,
    #[serde(rename = "% doublets")]
    pub doublets_pct: String,
    #[serde(rename = "% ambient RNA")]
    pub ambient_rna_pct: String,
    #[serde(rename = "% vdj genes")]
    pub vdj_pct: String,
    #[serde(rename = "% RBC")]
    pub rbc_pct: String,
    #[serde(rename = "Last Processed")]
    pub last_processed: String,
}

impl SampleDigestRow {
    /// Row with every field at its "nothing seen yet" default.
    pub fn seeded(sample_id: impl Into<String>) -> Self {
        Self {
            sample_id: sample_id.into(),
            cell_count: "0".to_string(),
            failed: false,
            warning: false,
            failure_reason: String::new(),
            warning_reason: String::new(),
            doublets_pct: UNSEEN_PERCENT.to_string(),
            ambient_rna_pct: UNSEEN_PERCENT.to_string(),
            vdj_pct: UNSEEN_PERCENT.to_string(),
            rbc_pct: UNSEEN_PERCENT.to_string(),
            last_processed: String::new(),
        }
    }
}

/// One row of the library metrics digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LibraryMetricsRow {
    pub lib_id: String,
    #[serde(rename = "# Cells Before QC")]
    pub cells_before_qc: String,
    #[serde(rename = "# Cells After QC")]
    pub cells_after_qc: String,
    pub corresponding_gex_lib: String,
    pub donor_id: String,
    pub lib_type: String,
}

impl LibraryMetricsRow {
    pub fn seeded(lib_id: impl Into<String>, lib_type: impl Into<String>) -> Self {
        Self {
            lib_id: lib_id.into(),
            cells_before_qc: "0".to_string(),
            cells_after_qc: "0".to_string(),
            corresponding_gex_lib: UNKNOWN_FIELD.to_string(),
            donor_id: UNKNOWN_FIELD.to_string(),
            lib_type: lib_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_of<T: Serialize>(row: &T) -> String {
        let mut w = csv::Writer::from_writer(Vec::new());
        w.serialize(row).unwrap();
        let bytes = w.into_inner().unwrap();
        String::from_utf8(bytes).unwrap().lines().next().unwrap().to_string()
    }

    #[test]
    fn sample_row_header_matches_column_constants() {
        let header = header_of(&SampleDigestRow::seeded("1"));
        assert_eq!(header, SAMPLE_DIGEST_HEADERS.join(","));
    }

    #[test]
    fn library_row_header_matches_column_constants() {
        let header = header_of(&LibraryMetricsRow::seeded("1", "GEX"));
        assert_eq!(header, LIBRARY_METRICS_HEADERS.join(","));
    }

    #[test]
    fn seeded_sample_row_serializes_defaults() {
        let mut w = csv::Writer::from_writer(Vec::new());
        w.serialize(SampleDigestRow::seeded("1234")).unwrap();
        let text = String::from_utf8(w.into_inner().unwrap()).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "1234,0,No,No,,,-1,-1,-1,-1,");
    }
}
