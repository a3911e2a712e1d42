//! Digest aggregation.
//!
//! Turns fetched [`LogRecord`]s into what the reports show: the alertable
//! lines of each log, or one tabular row per object. Every line of a log is
//! visited once, in order. Single-valued columns keep the last value a probe
//! extracted; failure and warning reasons accumulate.

use logdigest_classify::{LinePredicate, is_failure, is_warning};
use logdigest_ids::{LibraryType, library_from_file_name, sample_id_from_file_name};
use logdigest_schema::digest::{LibraryMetricsRow, REASON_SEPARATOR, SampleDigestRow};
use logdigest_schema::record::LogRecord;
use logdigest_template::qc::{LibraryProbes, Probe, SampleProbes, date_from_start_time};

/// The lines of one log that passed a predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection<'r> {
    pub file_name: &'r str,
    pub lines: Vec<&'r str>,
}

/// Matching lines per log, skipping logs with no match at all.
pub fn select<'r, P>(records: &'r [LogRecord], predicate: &P) -> Vec<Selection<'r>>
where
    P: LinePredicate + ?Sized,
{
    records
        .iter()
        .filter_map(|r| {
            let lines = logdigest_classify::select_lines(&r.lines, predicate);
            (!lines.is_empty()).then(|| Selection {
                file_name: r.file_name(),
                lines,
            })
        })
        .collect()
}

/// A log line as it appears in a reason column: outer double quotes and
/// surrounding whitespace removed.
pub fn strip_reason(line: &str) -> &str {
    line.trim_matches('"').trim()
}

pub fn append_reason(reasons: &mut String, line: &str) {
    if !reasons.is_empty() {
        reasons.push_str(REASON_SEPARATOR);
    }
    reasons.push_str(strip_reason(line));
}

fn probe_into(probe: &Probe, line: &str, field: &mut String) -> bool {
    match probe.apply(line) {
        Some(v) => {
            *field = v;
            true
        }
        None => false,
    }
}

/// One sample digest row. The sample id comes from the log file name.
pub fn sample_row(record: &LogRecord, probes: &SampleProbes) -> SampleDigestRow {
    let sample_id =
        sample_id_from_file_name(record.file_name()).unwrap_or(record.object_id.as_str());
    let mut row = SampleDigestRow::seeded(sample_id);

    for line in &record.lines {
        probe_into(&probes.cells, line, &mut row.cell_count);
        if is_failure(line) {
            row.failed = true;
            append_reason(&mut row.failure_reason, line);
        }
        if is_warning(line) {
            row.warning = true;
            append_reason(&mut row.warning_reason, line);
        }
        probe_into(&probes.doublets, line, &mut row.doublets_pct);
        probe_into(&probes.ambient_rna, line, &mut row.ambient_rna_pct);
        probe_into(&probes.vdj, line, &mut row.vdj_pct);
        probe_into(&probes.rbc, line, &mut row.rbc_pct);
        if let Some(start) = probes.start_time.apply(line) {
            row.last_processed = date_from_start_time(&start);
        }
    }
    row
}

pub fn build_sample_rows(records: &[LogRecord], probes: &SampleProbes) -> Vec<SampleDigestRow> {
    records.iter().map(|r| sample_row(r, probes)).collect()
}

/// One library metrics row, or `None` when the file name does not carry a
/// library type and id.
pub fn library_row(record: &LogRecord, probes: &LibraryProbes) -> Option<LibraryMetricsRow> {
    let (lib_type, lib_id) = library_from_file_name(record.file_name())?;
    let is_gex = lib_type == LibraryType::Gex.as_str();
    let mut row = LibraryMetricsRow::seeded(lib_id, lib_type);

    for line in &record.lines {
        probe_into(&probes.cells_before_qc, line, &mut row.cells_before_qc);
        probe_into(probes.cells_after_qc(is_gex), line, &mut row.cells_after_qc);
        if !is_gex {
            probe_into(&probes.corresponding_gex, line, &mut row.corresponding_gex_lib);
        }
        probe_into(&probes.donor, line, &mut row.donor_id);
    }
    Some(row)
}

/// Library rows, restricted to `lib_types` when given.
pub fn build_library_rows(
    records: &[LogRecord],
    probes: &LibraryProbes,
    lib_types: Option<&[LibraryType]>,
) -> Vec<LibraryMetricsRow> {
    records
        .iter()
        .filter(|r| match (lib_types, library_from_file_name(r.file_name())) {
            (Some(wanted), Some((t, _))) => wanted.iter().any(|w| w.as_str() == t),
            _ => true,
        })
        .filter_map(|r| library_row(r, probes))
        .collect()
}
