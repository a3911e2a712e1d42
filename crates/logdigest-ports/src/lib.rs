use anyhow::Result;
use logdigest_ids::{LibraryType, ObjectId, Version};
use std::path::Path;

/// What a transfer call ran and what it printed.
///
/// The response is kept raw; callers log it and treat an empty response as a
/// failed transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferReport {
    pub command: String,
    pub response: String,
}

impl TransferReport {
    pub fn is_empty_response(&self) -> bool {
        self.response.trim().is_empty()
    }
}

/// Remote bucket namespace, laid out as `{category}/{prefix}/{version}/{file}`.
///
/// Adapters live in `logdigest-store-*` crates; an in-memory one lives in the testkit.
pub trait ObjectStore {
    /// Every key under `prefix`, recursively, relative to the bucket root.
    fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Download exactly `file_name` from `remote_dir` into `local_dir`.
    fn sync_file(&self, remote_dir: &str, local_dir: &Path, file_name: &str)
    -> Result<TransferReport>;

    /// Copy a single key to a local path.
    fn copy(&self, key: &str, local_path: &Path) -> Result<TransferReport>;
}

/// `{category}/{prefix}`: everything ever written for one object.
pub fn object_namespace(category: &str, prefix: &str) -> String {
    format!("{category}/{prefix}")
}

/// `{category}/{prefix}/{version}`: one processing run of one object.
pub fn version_dir(category: &str, prefix: &str, version: &Version) -> String {
    format!("{category}/{prefix}/{version}")
}

/// One row of the Samples sheet, reduced to what digestion needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SampleRecord {
    pub sample_id: String,
    pub donor_id: String,
    pub gex_libs: Vec<String>,
    pub bcr_libs: Vec<String>,
    pub tcr_libs: Vec<String>,
}

impl SampleRecord {
    pub fn libraries(&self, lib_type: LibraryType) -> &[String] {
        match lib_type {
            LibraryType::Gex => &self.gex_libs,
            LibraryType::Bcr => &self.bcr_libs,
            LibraryType::Tcr => &self.tcr_libs,
        }
    }
}

/// Tabular sample metadata (the Samples sheet).
pub trait MetadataSource {
    /// The donor's samples, in sheet order.
    fn samples_for_donor(&self, donor_id: &str) -> Result<Vec<SampleRecord>>;
}

/// Output modes a driver may offer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestMode {
    /// Alertable lines printed per object.
    Text,
    /// Full sample digest CSV on stdout.
    SampleCsv,
    /// Library metrics rows appended to a CSV file.
    LibraryMetrics,
}

/// Parameterises the generic digestion logic for one kind of processing log.
pub trait DigestDriver {
    /// Short name used in messages ("sample", "library").
    fn name(&self) -> &str;

    /// Objects to digest, in metadata order.
    fn object_ids(&self) -> Result<Vec<ObjectId>>;

    /// Remote folder name under the object's category.
    fn object_prefix(&self, object_id: &ObjectId) -> String;

    fn log_file_name(&self, object_id: &ObjectId, version: &Version) -> String;

    /// Top-level remote folder: `processed_samples`, `processed_libraries`.
    fn remote_category(&self) -> &str;

    fn supports(&self, mode: DigestMode) -> bool {
        let _ = mode;
        true
    }
}
