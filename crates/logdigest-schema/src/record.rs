use logdigest_ids::{ObjectId, Version, file_name_of};
use std::path::PathBuf;

/// Marker printed next to missing-log placeholders so they stand out in reports.
pub const NOT_FOUND_SIGN: &str = "❗️❓";

/// The single line a missing log is replaced with.
///
/// Aggregation never special-cases missing files: this line carries the
/// `NOT FOUND` failure marker, so a missing log digests exactly like a log
/// containing only this line.
pub fn not_found_line() -> String {
    format!(
        "NOT FOUND {NOT_FOUND_SIGN} No logs were found. Either processing failed or logs are unavailable."
    )
}

/// Why a log could not be read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MissingReason {
    /// No version could be resolved for the object.
    UnresolvedVersion,
    /// The expected file is not on disk after fetching, or the transfer
    /// that should have produced it failed.
    FileAbsent,
    /// The file exists but holds no lines.
    EmptyLog,
}

/// Per-object result of fetching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Found,
    Missing(MissingReason),
}

/// One object's log, fetched and split into lines.
///
/// Read-only once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    pub object_id: ObjectId,
    pub version: Version,
    pub path: PathBuf,
    pub outcome: FetchOutcome,
    /// Lines without their trailing newline.
    pub lines: Vec<String>,
}

impl LogRecord {
    pub fn found(object_id: ObjectId, version: Version, path: PathBuf, lines: Vec<String>) -> Self {
        Self {
            object_id,
            version,
            path,
            outcome: FetchOutcome::Found,
            lines,
        }
    }

    pub fn missing(
        object_id: ObjectId,
        version: Version,
        path: PathBuf,
        reason: MissingReason,
    ) -> Self {
        Self {
            object_id,
            version,
            path,
            outcome: FetchOutcome::Missing(reason),
            lines: vec![not_found_line()],
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Missing(_))
    }

    /// Bare file name of the log, used for row identity and report headers.
    pub fn file_name(&self) -> &str {
        self.path
            .to_str()
            .map(file_name_of)
            .unwrap_or_default()
    }
}
