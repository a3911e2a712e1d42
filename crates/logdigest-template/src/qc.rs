//! QC lines written by the processing steps, and the probes that read them.

use crate::Template;
use anyhow::Result;
use chrono::NaiveDateTime;

pub const CELLS: &str = "Final number of cells: {}, final number of genes: {}.";
pub const DOUBLETS: &str =
    "Removed {} estimated doublets (percent removed: {}%); {} droplets remained.";
pub const AMBIENT_RNA: &str = "Removed {} cells (percent removed: {}%) with total decontaminated counts below filter_decontaminated_cells_min_genes={}";
pub const VDJ: &str = "Removed {} vdj genes (percent removed: {}%); {} genes remained.";
pub const RBC: &str = "Removed {} red blood cells (percent removed: {}%); {} droplets remained.";

/// The start time is not followed by a period, so the ` (` that opens the
/// timezone note closes the slot.
pub const START_TIME: &str = "Starting time: {} (";

/// How processing steps format their start time.
pub const START_TIME_FORMAT: &str = "%H:%M, %m-%d-%Y";
/// How the digest reports the day a sample was last processed.
pub const DATE_FORMAT: &str = "%m-%d-%Y";

pub const LIB_CELLS_BEFORE_QC: &str = "Started with a total of {} cells";
pub const LIB_CELLS_AFTER_QC_GEX: &str = "Final number of cells: {},";
pub const LIB_CELLS_AFTER_QC_IR: &str = "Final number of cells: {}.";
pub const LIB_CORRESPONDING_GEX: &str = ", 'corresponding_gex_lib': '{}',";
pub const LIB_DONOR: &str = ", 'donor': '{}',";

/// A template plus the slot whose value feeds a digest column.
#[derive(Clone, Debug)]
pub struct Probe {
    template: Template,
    field: usize,
}

impl Probe {
    pub fn compile(template: &str, field: usize) -> Result<Self> {
        Ok(Self {
            template: Template::compile(template)?,
            field,
        })
    }

    pub fn apply(&self, line: &str) -> Option<String> {
        self.template.extract(line, self.field)
    }

    pub fn template(&self) -> &Template {
        &self.template
    }
}

/// Probes run over every line of a sample processing log.
#[derive(Clone, Debug)]
pub struct SampleProbes {
    pub cells: Probe,
    pub doublets: Probe,
    pub ambient_rna: Probe,
    pub vdj: Probe,
    pub rbc: Probe,
    pub start_time: Probe,
}

impl SampleProbes {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            cells: Probe::compile(CELLS, 0)?,
            doublets: Probe::compile(DOUBLETS, 1)?,
            ambient_rna: Probe::compile(AMBIENT_RNA, 1)?,
            vdj: Probe::compile(VDJ, 1)?,
            rbc: Probe::compile(RBC, 1)?,
            start_time: Probe::compile(START_TIME, 0)?,
        })
    }
}

/// Probes run over every line of a library processing log.
#[derive(Clone, Debug)]
pub struct LibraryProbes {
    pub cells_before_qc: Probe,
    cells_after_qc_gex: Probe,
    cells_after_qc_ir: Probe,
    pub corresponding_gex: Probe,
    pub donor: Probe,
}

impl LibraryProbes {
    pub fn compile() -> Result<Self> {
        Ok(Self {
            cells_before_qc: Probe::compile(LIB_CELLS_BEFORE_QC, 0)?,
            cells_after_qc_gex: Probe::compile(LIB_CELLS_AFTER_QC_GEX, 0)?,
            cells_after_qc_ir: Probe::compile(LIB_CELLS_AFTER_QC_IR, 0)?,
            corresponding_gex: Probe::compile(LIB_CORRESPONDING_GEX, 0)?,
            donor: Probe::compile(LIB_DONOR, 0)?,
        })
    }

    /// GEX logs follow the final cell count with the gene count; BCR/TCR
    /// logs end the sentence there.
    pub fn cells_after_qc(&self, is_gex: bool) -> &Probe {
        if is_gex {
            &self.cells_after_qc_gex
        } else {
            &self.cells_after_qc_ir
        }
    }
}

/// Date part of a logged start time, or the trimmed input if it does not parse.
pub fn date_from_start_time(raw: &str) -> String {
    let raw = raw.trim();
    match NaiveDateTime::parse_from_str(raw, START_TIME_FORMAT) {
        Ok(t) => t.format(DATE_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}
