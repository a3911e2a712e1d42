use logdigest_ids::VersionSpec;
use std::path::{Path, PathBuf};

/// Where the log files come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogSource {
    /// Logs live in the object store and are synced into `working_dir`.
    Remote {
        working_dir: PathBuf,
        credentials_file: PathBuf,
    },
    /// Logs were already downloaded into `logs_dir`.
    Local { logs_dir: PathBuf },
}

impl LogSource {
    pub fn is_remote(&self) -> bool {
        matches!(self, LogSource::Remote { .. })
    }

    /// Directory the log files are read from once fetched.
    pub fn logs_dir(&self) -> &Path {
        match self {
            LogSource::Remote { working_dir, .. } => working_dir,
            LogSource::Local { logs_dir } => logs_dir,
        }
    }
}

/// Everything one digestion run needs to know about its scope.
///
/// Built once from the command line; never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunContext {
    pub donor_id: String,
    pub seq_run: String,
    pub source: LogSource,
    pub version: VersionSpec,
    /// Version used for immune-receptor (BCR/TCR) library logs.
    pub version_ir: VersionSpec,
}

impl RunContext {
    /// GEX objects use `version`; everything else is pinned by `version_ir`.
    /// A `latest` request covers every object.
    pub fn version_for_prefix(&self, prefix: &str) -> VersionSpec {
        if self.version.is_latest() || prefix.contains("GEX") {
            self.version
        } else {
            self.version_ir
        }
    }
}
