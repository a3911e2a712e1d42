//! Report writers.
//!
//! Reports go to any `io::Write` so the binary can hand in stdout and tests a
//! buffer. The library metrics CSV is the one persistent artifact: rows are
//! appended and the header is written only when the file is new.

use anyhow::{Context, Result};
use logdigest_aggregate::Selection;
use logdigest_schema::digest::{
    LIBRARY_METRICS_HEADERS, LibraryMetricsRow, SAMPLE_DIGEST_HEADERS, SampleDigestRow,
};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Drawn between the blocks of consecutive logs.
pub const SEPARATOR_LINE: &str =
    "--------------------------------------------------------------------------------";

/// One block per log: the file name, then each selected line behind a tab.
pub fn write_text_digest<W: Write>(out: &mut W, selections: &[Selection<'_>]) -> Result<()> {
    for (i, sel) in selections.iter().enumerate() {
        if i > 0 {
            writeln!(out, "{SEPARATOR_LINE}")?;
        }
        writeln!(out, "{}:\n", sel.file_name)?;
        for line in &sel.lines {
            writeln!(out, "\t{line}\n")?;
        }
    }
    out.flush().context("flush text digest")?;
    Ok(())
}

fn write_csv<W: Write, R: Serialize>(out: W, headers: &[&str], rows: &[R]) -> Result<()> {
    let mut w = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    if !headers.is_empty() {
        w.write_record(headers).context("write csv header")?;
    }
    for row in rows {
        w.serialize(row).context("write csv row")?;
    }
    w.flush().context("flush csv")?;
    Ok(())
}

/// Header plus every row; the header is written even when there are no rows.
pub fn write_sample_csv<W: Write>(out: W, rows: &[SampleDigestRow]) -> Result<()> {
    write_csv(out, &SAMPLE_DIGEST_HEADERS, rows)
}

pub fn write_library_csv<W: Write>(out: W, rows: &[LibraryMetricsRow]) -> Result<()> {
    write_csv(out, &LIBRARY_METRICS_HEADERS, rows)
}

/// Append `rows` to the metrics file at `path`, creating it with a header
/// when it does not exist yet.
pub fn append_library_csv(path: &Path, rows: &[LibraryMetricsRow]) -> Result<()> {
    let is_new = !path.exists();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open {path:?} for append"))?;
    let headers: &[&str] = if is_new { &LIBRARY_METRICS_HEADERS } else { &[] };
    write_csv(file, headers, rows).with_context(|| format!("append to {path:?}"))
}
